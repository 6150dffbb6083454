pub mod entities;
pub mod seaorm;
pub mod sinks;
pub mod snapshot;
pub mod storage;

pub use seaorm::SeaOrmStorage;
pub use sinks::DbEventSink;
pub use snapshot::{
    ChatMessageRow, ChatSessionRow, ConditionalDebitOutcome, CredentialLimitsRow, CredentialRow,
    CreditTransactionRow, GlobalConfigRow, PlanRow, PrincipalProfileRow, ProviderRow,
    StorageSnapshot, UserKeyRow, UserRow,
};
pub use storage::{
    ActivityRecord, CreditTransactionKind, LogCursor, LogQueryFilter, LogQueryResult, LogRecord,
    LogRecordKind, NewChatMessage, NewCreditTransaction, Storage, StorageError, StorageResult,
    UsageAggregate, UsageAggregateFilter,
};
