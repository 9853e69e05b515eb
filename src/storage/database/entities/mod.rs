/// Permission definition entity module
pub mod rbac_permission;
/// Permission link entity module
pub mod rbac_linked_permission;
/// Default permission entity module
pub mod rbac_default_permission;
/// Explicit account permission entity module
pub mod rbac_account_permission;

pub use rbac_account_permission::Entity as RbacAccountPermission;
pub use rbac_default_permission::Entity as RbacDefaultPermission;
pub use rbac_linked_permission::Entity as RbacLinkedPermission;
pub use rbac_permission::Entity as RbacPermission;
