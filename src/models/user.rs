use serde::{Deserialize, Serialize};

use super::RecordId;

/// Marketplace profile, keyed by the auth user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,

    #[serde(rename = "nombre", default)]
    pub name: String,

    #[serde(rename = "correo", default)]
    pub email: Option<String>,

    #[serde(rename = "esAdmin", default)]
    pub is_admin: Option<bool>,

    #[serde(rename = "fotoPerfil", default)]
    pub avatar: Option<String>,
}

impl User {
    pub const TABLE: &'static str = "Usuarios";

    pub fn is_admin(&self) -> bool {
        self.is_admin.unwrap_or(false)
    }

    /// Name to show next to the user's content
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.email.as_deref().unwrap_or("")
        } else {
            &self.name
        }
    }
}

/// Profile row inserted after sign-up
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub id: RecordId,

    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "correo", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(rename = "fotoPerfil", skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Partial profile update; unset fields are left alone
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserPatch {
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "correo", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(rename = "esAdmin", skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,

    #[serde(rename = "fotoPerfil", skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// The author columns attached to comments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: RecordId,

    #[serde(rename = "nombre", default)]
    pub name: Option<String>,

    #[serde(rename = "correo", default)]
    pub email: Option<String>,

    #[serde(rename = "esAdmin", default)]
    pub is_admin: Option<bool>,
}

impl UserSummary {
    pub const COLUMNS: &'static str = "id, nombre, correo, esAdmin";

    /// Name, falling back to the email, then to nothing
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_reads_remote_columns() {
        let user: User = serde_json::from_value(json!({
            "id": "a1b2",
            "nombre": "Lucía",
            "correo": "lucia@uni.edu",
            "esAdmin": true,
            "fotoPerfil": null
        }))
        .unwrap();
        assert_eq!(user.name, "Lucía");
        assert!(user.is_admin());
        assert!(user.avatar.is_none());
    }

    #[test]
    fn patch_only_sends_set_fields() {
        let patch = UserPatch {
            name: Some("Ana".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(patch).unwrap(), json!({ "nombre": "Ana" }));
    }

    #[test]
    fn summary_falls_back_to_email() {
        let summary = UserSummary {
            id: "u".into(),
            name: Some(" ".into()),
            email: Some("x@uni.edu".into()),
            is_admin: None,
        };
        assert_eq!(summary.display_name(), "x@uni.edu");
    }
}
