//! rtest CLI - re-run tests on save
//!
//! Binary name: `rtest`

use std::process;

use rtest::{app, cli, logging};

#[tokio::main]
async fn main() {
    let overrides = cli::overrides_from(&cli::build_cli().get_matches());
    logging::init(overrides.debug);

    let code = match app::run(overrides).await {
        Ok(()) => 0,
        Err(err) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Error: {err:#}");
            }
            err.downcast_ref::<rtest_core::Error>()
                .map_or(1, rtest_core::Error::exit_code)
        }
    };

    // The stdin reader sits in a blocking read that cannot be cancelled;
    // exiting here keeps runtime shutdown from waiting on it.
    #[allow(clippy::exit)]
    process::exit(code);
}
