//! Card Sort Common Library
//!
//! CLIと共有されるセッションモデル:
//! - types: Card / Candidate / Upload
//! - session: 進行中セッションの状態遷移
//! - categorizer: 確定カードの保管先判定

pub mod categorizer;
pub mod error;
pub mod session;
pub mod types;

pub use categorizer::{parse_price, parse_rank, sort_card, Bin};
pub use error::{Error, Result};
pub use session::{Resolution, SortSession};
pub use types::{Candidate, CandidateStatus, Card, Upload};
