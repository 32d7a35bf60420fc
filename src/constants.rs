//! TigerStyle Constants
//!
//! All limits use big-endian naming: CATEGORY_SPECIFICS_UNIT_LIMIT
//! Example: SEARCH_RESULTS_COUNT_MAX (not MAX_SEARCH_RESULTS)

// =============================================================================
// Configuration Keys
// =============================================================================

/// Prefix of every storage backend section (`storage.<backend>.*`)
pub const CONFIG_STORAGE_PREFIX: &str = "storage";

/// Suffix naming the driver kind of a backend (`storage.<backend>.driver`)
pub const CONFIG_DRIVER_SUFFIX: &str = "driver";

/// Key naming the default analyzer flow backend
pub const CONFIG_FLOW_BACKEND_KEY: &str = "analyzer.flow.backend";

/// Key listing coordination service endpoints
pub const CONFIG_ETCD_SERVERS_KEY: &str = "etcd.servers";

/// Key holding the log level filter
pub const CONFIG_LOGGING_LEVEL_KEY: &str = "logging.level";

/// Key holding the log output format
pub const CONFIG_LOGGING_FORMAT_KEY: &str = "logging.format";

/// Prefix of environment variables overriding file configuration
pub const CONFIG_ENV_PREFIX: &str = "FLOWSTORE_";

/// Level separator inside environment override names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// =============================================================================
// Driver Kinds
// =============================================================================

/// Document store driver kind
pub const DRIVER_ELASTICSEARCH: &str = "elasticsearch";

/// Graph database driver kind
pub const DRIVER_ORIENTDB: &str = "orientdb";

/// Reserved driver kind meaning storage is disabled
pub const DRIVER_MEMORY: &str = "memory";

/// Engine family of the document store driver
pub const FAMILY_ELASTICSEARCH: &str = "ElasticSearch";

/// Engine family of the graph database driver
pub const FAMILY_ORIENTDB: &str = "OrientDB";

// =============================================================================
// Search Limits
// =============================================================================

/// Maximum number of flows returned by a single search
pub const SEARCH_RESULTS_COUNT_MAX: usize = 10_000;

/// Maximum number of flows in a single store batch
pub const STORE_BATCH_COUNT_MAX: usize = 100_000;

// =============================================================================
// DST Limits
// =============================================================================

/// Maximum fault injection probability
pub const DST_FAULT_PROBABILITY_MAX: f64 = 1.0;

/// Environment variable holding the simulation seed
pub const DST_SEED_ENV: &str = "DST_SEED";
