use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{EntityId, EntityRecord, ParentRef};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fleettree=debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else if let Err(e) = subscriber.try_init() {
        eprintln!("Error: Failed to set up logging: {}", e);
    }
}

/// Group record with a parent given as id text, `"#"` meaning root.
pub fn group(id: &str, parent: &str, text: &str) -> EntityRecord {
    EntityRecord::group(id, ParentRef::from(EntityId::from(parent)), text)
}

/// Group record with an explicit `orderby`.
pub fn ordered_group(id: &str, parent: &str, text: &str, orderby: f64) -> EntityRecord {
    group(id, parent, text).with_orderby(orderby)
}

/// Records of the North/Fleet A/Fleet B example hierarchy.
pub fn north_fleet() -> Vec<EntityRecord> {
    vec![
        ordered_group("1", "#", "North", 1.0),
        ordered_group("2", "1", "Fleet A", 1.0),
        ordered_group("3", "1", "Fleet B", 2.0),
    ]
}
