/// Free generations granted to an identity without a pro plan.
pub const FREE_LIMIT: u32 = 3;

pub const DEFAULT_GENERATION_DELAY_MS: u64 = 500;
pub const DEFAULT_SESSION_EXPIRATION_IN_DAYS: i64 = 365;

// cookie session keys
pub const PRO_SESSION_KEY: &str = "pro";
pub const FREE_COUNT_SESSION_KEY: &str = "free_count";
pub const PENDING_CHECKOUT_SESSION_KEY: &str = "checkout_session_id";

// auth provider session token
pub const SESSION_TOKEN_COOKIE: &str = "__session";
pub const SESSION_COOKIE_NAME: &str = "contentscript_session";
