use clap::Parser;
use service::config::Config;

/// Settings that would otherwise be picked up from the environment of the
/// machine running the tests.
const ENV_BACKED_FLAGS: &[&str] = &[
    "--google-client-id",
    "--google-client-secret",
    "--gmail-refresh-token",
    "--ms-graph-client-id",
    "--ms-graph-client-secret",
    "--ms-graph-refresh-token",
    "--public-base-url",
];

/// Parse `args` with every credential and URL setting not given pinned to blank.
pub(crate) fn config(args: &[&str]) -> Config {
    let mut argv = vec!["leo"];
    for flag in ENV_BACKED_FLAGS {
        if !args.contains(flag) {
            argv.extend_from_slice(&[*flag, ""]);
        }
    }
    argv.extend_from_slice(args);
    Config::try_parse_from(argv).unwrap()
}

#[test]
fn test_config_ignores_unset_credentials() {
    let config = config(&["--google-client-id", "client-id"]);

    assert_eq!(config.google_client_id().as_deref(), Some("client-id"));
    assert_eq!(config.ms_graph_client_id().as_deref(), Some(""));
    assert_eq!(config.public_base_url(), None);
}
