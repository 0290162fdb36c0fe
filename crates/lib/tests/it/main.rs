/*! Integration tests for Podium.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - session: auth transitions (register, verify, login, logout, resume)
 * - vote: end-to-end vote casting through the session context
 * - view: view models derived from the ledger
 * - persistence: the storage document and file round-trips
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("podium=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod persistence;
mod session;
