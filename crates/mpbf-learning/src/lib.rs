//! # mpbf-learning
//!
//! Learning log for the MPBF assistant.
//!
//! Every confirmed command produces one learning record describing what the
//! user asked for, what the assistant did, whether it worked, and how long
//! it took. The records feed later prompt tuning and are never consulted on
//! the hot path, so logging failures must not disturb command handling.
//!
//! - **File output**: JSON Lines (one record per line)
//! - **Console output**: human-readable log lines
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mpbf_learning::{LearningLogger, LearningRecord};
//! use serde_json::json;
//!
//! # async fn example() {
//! let logger = LearningLogger::console_only();
//!
//! let record = LearningRecord::builder(7, "create_order")
//!     .context(json!({"message": "اضف طلب جديد"}))
//!     .success(true)
//!     .execution_time_ms(1250)
//!     .build();
//!
//! // Never fails; storage errors are logged and swallowed.
//! logger.record(record).await;
//! # }
//! ```

pub mod error;
pub mod logger;
pub mod record;
pub mod storage;

pub use error::LearningError;
pub use logger::{LearningFilter, LearningLogger};
pub use record::{LearningRecord, LearningRecordBuilder};
pub use storage::{
    ConsoleStorage, DualStorage, FileStorage, LearningStorage, MemoryStorage, NullStorage,
};
