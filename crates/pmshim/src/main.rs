//! Entry point. Two invocation shapes share this one binary:
//!
//! - **Shim mode**: invoked (directly, or via a generated `enable` shim)
//!   under one of the managed tool names — `npm`, `npx`, `pnpm`, `pnpx`,
//!   `yarn`, `yarnpkg` — or as `pmshim <tool>[@spec] <args…>`. Resolves a
//!   version, installs it if needed, and execs through to it.
//! - **Own-name mode**: invoked as `pmshim install|pack|use|enable …`,
//!   parsed with `clap` and dispatched to the matching `commands::*` module.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use context::AppContext;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    let invocation = Invocation::detect(&args);

    logging::init(invocation.verbose());

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => std::process::exit(error::report(&anyhow::anyhow!(err).context("reading the current directory"))),
    };

    let code = match AppContext::load(cwd) {
        Ok(mut ctx) => run(&mut ctx, invocation).await,
        Err(err) => Err(err),
    };

    std::process::exit(match code {
        Ok(code) => code,
        Err(err) => error::report(&err),
    });
}

/// The two ways this binary can be invoked, sniffed out of `argv` before any
/// other parsing happens.
enum Invocation {
    /// Dispatch through to a managed tool under `command_name`, optionally
    /// with an inline `name@spec` override, forwarding `args` verbatim.
    Shim {
        command_name: String,
        inline_spec: Option<String>,
        args: Vec<String>,
    },
    /// One of this binary's own subcommands.
    OwnCommand(cli::Cli),
}

impl Invocation {
    /// `argv[0]`'s basename, stripped of a Windows `.exe` suffix if present.
    fn basename(argv0: &str) -> String {
        let stem = std::path::Path::new(argv0)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(argv0);
        stem.to_string()
    }

    /// Shim mode forwards every argument verbatim to the managed tool, so
    /// `--verbose` is not intercepted there; only `PMSHIM_LOG`/`RUST_LOG`
    /// control its logging. Own-command mode honors the `--verbose` flag.
    fn verbose(&self) -> bool {
        match self {
            Self::Shim { .. } => false,
            Self::OwnCommand(cli) => cli.verbose,
        }
    }

    /// Decide which invocation shape `args` (full `argv`, including
    /// `argv[0]`) represents.
    fn detect(args: &[String]) -> Self {
        let argv0 = args.first().map(String::as_str).unwrap_or("pmshim");
        let basename = Self::basename(argv0);

        if pmshim_config::lookup_command_family(&basename).is_some() {
            return Self::Shim {
                command_name: basename,
                inline_spec: None,
                args: args[1..].to_vec(),
            };
        }

        let rest = &args[1..];
        match rest.first().map(String::as_str) {
            Some("install" | "pack" | "use" | "enable") => {
                match cli::Cli::try_parse_from(args) {
                    Ok(parsed) => Self::OwnCommand(parsed),
                    Err(clap_err) => clap_err.exit(),
                }
            }
            Some(token) if token.starts_with('-') => match cli::Cli::try_parse_from(args) {
                Ok(parsed) => Self::OwnCommand(parsed),
                Err(clap_err) => clap_err.exit(),
            },
            Some(token) => {
                // `inline_spec` is the whole `name@version` token: the
                // resolver's parser needs the name half to know which tool is
                // being overridden, not just the version half. `command_name`
                // stays just the name half, since that's what the dispatcher
                // later uses to pick an entrypoint among a tool's aliases.
                let (command_name, inline_spec) = match token.split_once('@') {
                    Some((name, _spec)) => (name.to_string(), Some(token.to_string())),
                    None => (token.to_string(), None),
                };
                Self::Shim {
                    command_name,
                    inline_spec,
                    args: rest[1..].to_vec(),
                }
            }
            None => match cli::Cli::try_parse_from(args) {
                Ok(parsed) => Self::OwnCommand(parsed),
                Err(clap_err) => clap_err.exit(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn one_shot_override_keeps_the_whole_spec_for_the_resolver() {
        match Invocation::detect(&args(&["pmshim", "pnpm@8.1.0", "install"])) {
            Invocation::Shim {
                command_name,
                inline_spec,
                args,
            } => {
                assert_eq!(command_name, "pnpm");
                assert_eq!(inline_spec.as_deref(), Some("pnpm@8.1.0"));
                assert_eq!(args, vec!["install".to_string()]);
            }
            Invocation::OwnCommand(_) => panic!("expected shim mode"),
        }
    }

    #[test]
    fn plain_tool_invocation_has_no_inline_spec() {
        match Invocation::detect(&args(&["pmshim", "yarn", "--version"])) {
            Invocation::Shim {
                command_name,
                inline_spec,
                ..
            } => {
                assert_eq!(command_name, "yarn");
                assert_eq!(inline_spec, None);
            }
            Invocation::OwnCommand(_) => panic!("expected shim mode"),
        }
    }

    #[test]
    fn basename_invocation_never_carries_an_inline_spec() {
        match Invocation::detect(&args(&["/usr/local/bin/yarn", "--version"])) {
            Invocation::Shim {
                command_name,
                inline_spec,
                ..
            } => {
                assert_eq!(command_name, "yarn");
                assert_eq!(inline_spec, None);
            }
            Invocation::OwnCommand(_) => panic!("expected shim mode"),
        }
    }
}

async fn run(ctx: &mut AppContext, invocation: Invocation) -> anyhow::Result<i32> {
    match invocation {
        Invocation::Shim {
            command_name,
            inline_spec,
            args,
        } => {
            let subcommand = args.first().map(String::as_str);
            commands::shim::run(
                ctx,
                &command_name,
                subcommand,
                inline_spec.as_deref(),
                &args,
            )
            .await
        }
        Invocation::OwnCommand(cli) => match cli.command {
            cli::Command::Install { specs, global } => commands::install::run(ctx, &specs, global).await,
            cli::Command::Pack { specs, output } => commands::pack::run(ctx, &specs, &output).await,
            cli::Command::Use { spec } => commands::use_cmd::run(ctx, &spec).await,
            cli::Command::Enable {
                install_directory,
                tools,
            } => commands::enable::run(install_directory.as_deref(), &tools).await,
        },
    }
}
