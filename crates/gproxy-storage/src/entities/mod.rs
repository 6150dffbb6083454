pub mod credential_disallow;
pub mod credentials;
pub mod downstream_requests;
pub mod global_config;
pub mod internal_events;
pub mod providers;
pub mod upstream_requests;
pub mod upstream_traffic;
pub mod upstream_usages;
pub mod user_keys;
pub mod users;

pub mod credit_transactions;
pub mod chat_messages;
pub mod chat_sessions;
pub mod credential_limits;
pub mod plans;
pub mod principal_profiles;

pub use credential_disallow::Entity as CredentialDisallow;
pub use credentials::Entity as Credentials;
pub use downstream_requests::Entity as DownstreamRequests;
pub use global_config::Entity as GlobalConfig;
pub use internal_events::Entity as InternalEvents;
pub use providers::Entity as Providers;
pub use upstream_requests::Entity as UpstreamRequests;
pub use upstream_traffic::Entity as UpstreamTraffic;
pub use upstream_usages::Entity as UpstreamUsages;
pub use user_keys::Entity as UserKeys;
pub use users::Entity as Users;

pub use chat_messages::Entity as ChatMessages;
pub use chat_sessions::Entity as ChatSessions;
pub use credential_limits::Entity as CredentialLimits;
pub use credit_transactions::Entity as CreditTransactions;
pub use plans::Entity as Plans;
pub use principal_profiles::Entity as PrincipalProfiles;
