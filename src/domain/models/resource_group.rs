use sea_orm::prelude::Uuid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroupId(Uuid);

impl ResourceGroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ResourceGroupId {
    fn default() -> Self {
        Self::new()
    }
}

/// Container owned by an administrator account, created in the same
/// transaction as the account itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceGroup {
    id: ResourceGroupId,
    name: String,
}

impl ResourceGroup {
    pub fn new(id: ResourceGroupId, name: String) -> Self {
        Self { id, name }
    }

    /// Workspace name derived from the holder's display name.
    pub fn name_for(display_name: &str) -> String {
        format!("{}'s Workspace", display_name)
    }

    pub fn id(&self) -> &ResourceGroupId {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_name_derives_from_display_name() {
        assert_eq!(ResourceGroup::name_for("Ann"), "Ann's Workspace");
    }
}
