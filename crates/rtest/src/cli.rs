//! CLI argument definitions
//!
//! Every rtest flag carries an `rtest-` prefix so it cannot shadow a flag of
//! the test tool. Everything else on the command line, including arguments
//! that start with `-`, is handed to each test run unchanged.

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use rtest_core::CliOverrides;

pub fn build_cli() -> Command {
    Command::new("rtest")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Re-run go test for the directory of every saved .go file")
        .long_about(
            "Re-run Tests on Save\n\
             \n\
             WHAT IT DOES:\n\
             Watches every directory under the root (except vendor/) and,\n\
             when a source file is created or written, runs the test command\n\
             in that file's directory. Output goes straight to the terminal.\n\
             \n\
             MANUAL RUNS:\n\
             Press enter to run the tests of the whole root directory.\n\
             \n\
             CONFIGURATION:\n  \
             • rtest.toml in the root  - [command] program, args, source_extension\n  \
             • RTEST_PROGRAM           - test program (default: go)\n  \
             • RTEST_SOURCE_EXT        - source extension (default: go)\n  \
             • RUST_LOG                - log filter, overrides --rtest-debug",
        )
        .arg(
            Arg::new("debug")
                .long("rtest-debug")
                .action(ArgAction::SetTrue)
                .help("Turn on watcher debug information"),
        )
        .arg(
            Arg::new("root")
                .long("rtest-root")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Directory to watch (default: current directory)"),
        )
        .arg(
            Arg::new("no_input")
                .long("rtest-no-input")
                .action(ArgAction::SetTrue)
                .help("Do not read manual triggers from stdin"),
        )
        .arg(
            Arg::new("test_args")
                .value_name("TEST_ARGS")
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .help("Extra arguments passed verbatim to every test run"),
        )
        .after_help(
            "EXAMPLES:\n  \
             # Run go test on every save\n  \
             rtest\n\
             \n  \
             # Verbose, race-checked runs\n  \
             rtest -v -race\n\
             \n  \
             # Watch another tree with debug output\n  \
             rtest --rtest-debug --rtest-root ../service -- -run TestHandler",
        )
}

/// Collect the parsed flags for configuration loading
pub fn overrides_from(matches: &ArgMatches) -> CliOverrides {
    CliOverrides {
        root: matches.get_one::<PathBuf>("root").cloned(),
        debug: matches.get_flag("debug"),
        no_input: matches.get_flag("no_input"),
        extra_args: matches
            .get_many::<String>("test_args")
            .map(|args| args.cloned().collect())
            .unwrap_or_default(),
    }
}
