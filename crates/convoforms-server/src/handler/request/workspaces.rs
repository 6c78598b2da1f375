//! Workspace request types.

use convoforms_access::{CreateWorkspace as CreateWorkspaceInput, UpdateWorkspaceDetails};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validations::{json_object, not_blank, workspace_slug};

/// Request payload for creating a workspace. The caller becomes its owner.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspace {
    /// Display name (1-100 characters).
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub name: String,
    /// URL-safe identifier. Derived from the name when omitted.
    #[validate(custom(function = "workspace_slug"))]
    pub slug: Option<String>,
    /// Optional description (max 500 characters).
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl CreateWorkspace {
    #[inline]
    pub fn into_input(self) -> CreateWorkspaceInput {
        CreateWorkspaceInput {
            name: self.name,
            slug: self.slug,
            description: self.description,
        }
    }
}

/// Request payload to update a workspace.
///
/// Only provided fields change. An empty `description` clears it. The slug
/// cannot be changed.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkspace {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Replaces the settings object as a whole.
    #[validate(custom(function = "json_object"))]
    pub settings: Option<serde_json::Value>,
}

impl UpdateWorkspace {
    #[inline]
    pub fn into_details(self) -> UpdateWorkspaceDetails {
        UpdateWorkspaceDetails {
            name: self.name,
            description: self.description.map(Some),
            settings: self.settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_validation() {
        let request = CreateWorkspace {
            name: "Acme".to_owned(),
            slug: Some("acme".to_owned()),
            description: None,
        };
        assert!(request.validate().is_ok());

        let request = CreateWorkspace {
            name: "Acme".to_owned(),
            slug: Some("Not A Slug".to_owned()),
            description: None,
        };
        assert!(request.validate().is_err());

        let request = CreateWorkspace {
            name: " ".to_owned(),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn empty_description_clears() {
        let request: UpdateWorkspace =
            serde_json::from_value(serde_json::json!({ "description": "" }))
                .unwrap_or_default();
        let details = request.into_details();
        assert_eq!(details.description, Some(Some(String::new())));
        assert!(details.name.is_none());
    }

    #[test]
    fn settings_must_be_an_object() {
        let request = UpdateWorkspace {
            settings: Some(serde_json::json!("dark")),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}
