pub const ADJUSTMENT_CREATED: &str = "ADJUSTMENT_CREATED";
pub const ADJUSTMENT_UPDATED: &str = "ADJUSTMENT_UPDATED";
pub const ADJUSTMENT_DELETED: &str = "ADJUSTMENT_DELETED";
pub const MONTHLY_BALANCES_GENERATED: &str = "MONTHLY_BALANCES_GENERATED";

pub const ALLOWED_PAGE_SIZES: [u32; 4] = [10, 20, 50, 100];
pub const DEFAULT_PAGE: u32 = 0;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub const MIN_ADJUSTMENT_YEAR: i32 = 2000;
pub const MAX_ADJUSTMENT_YEAR: i32 = 2100;
pub const MAX_REASON_LENGTH: usize = 255;
pub const MAX_AMOUNT_SCALE: u32 = 2;
