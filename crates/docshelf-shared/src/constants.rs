/// Application name
pub const APP_NAME: &str = "docshelf";

/// Storage key prefix of a user's document partition
pub const DOCUMENTS_KEY_PREFIX: &str = "app_documents_user_";

/// Storage key prefix of a user's comment partition
pub const COMMENTS_KEY_PREFIX: &str = "app_comments_user_";

/// Storage key of the (non-partitioned) category registry
pub const CATEGORIES_KEY: &str = "app_categories";

/// Category assigned to freshly uploaded documents
pub const DEFAULT_CATEGORY: &str = "General";

/// Author name used when a comment is written without a signed-in name
pub const FALLBACK_AUTHOR: &str = "Current User";

/// Simulated upload latency in milliseconds
pub const DEFAULT_UPLOAD_DELAY_MS: u64 = 2_000;

/// Maximum accepted upload size in bytes (50 MiB)
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// Default base URL of the REST backend
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Scheme prefix of issued transient handles
pub const HANDLE_SCHEME: &str = "blob:docshelf/";

/// Category colour palette; a colour is picked once at creation.
pub const PALETTE: [&str; 8] = [
    "bg-green-500",
    "bg-blue-500",
    "bg-purple-500",
    "bg-orange-500",
    "bg-pink-500",
    "bg-indigo-500",
    "bg-red-500",
    "bg-yellow-500",
];

/// Storage key of a user's document partition.
pub fn documents_key(user_id: i64) -> String {
    format!("{DOCUMENTS_KEY_PREFIX}{user_id}")
}

/// Storage key of a user's comment partition.
pub fn comments_key(user_id: i64) -> String {
    format!("{COMMENTS_KEY_PREFIX}{user_id}")
}
