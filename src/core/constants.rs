pub const USER_ADDED: &str = "USER_ADDED";
pub const USER_DELETED: &str = "USER_DELETED";
pub const TRANSACTION_ADDED: &str = "TRANSACTION_ADDED";
pub const TRANSACTION_EDITED: &str = "TRANSACTION_EDITED";
pub const TRANSACTION_SOFT_DELETED: &str = "TRANSACTION_SOFT_DELETED";
pub const TRANSACTION_DELETED: &str = "TRANSACTION_DELETED";
pub const PAYMENT_ADDED: &str = "PAYMENT_ADDED";
pub const PAYMENT_EDITED: &str = "PAYMENT_EDITED";
pub const PAYMENT_SOFT_DELETED: &str = "PAYMENT_SOFT_DELETED";
pub const PAYMENT_DELETED: &str = "PAYMENT_DELETED";

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_REMARK_LENGTH: usize = 255;

pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const MAX_PAGE_LIMIT: usize = 100;
