//! Result DTOs for the Moodle web-service functions this crate wraps.
//!
//! # Design
//! Only the fields callers commonly need are declared; unknown fields are
//! ignored. Anything the server may omit is `#[serde(default)]` so a sparse
//! record still deserializes.

use serde::{Deserialize, Deserializer, Serialize};

/// Issued by `login/token.php`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthToken {
    pub token: String,
    #[serde(default)]
    pub privatetoken: Option<String>,
}

/// A non-fatal problem reported next to a result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Warning {
    pub item: Option<String>,
    pub itemid: Option<i64>,
    pub warningcode: String,
    pub message: String,
}

/// Result of calls that answer with `null` or `{"warnings": [...]}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct Success {
    pub warnings: Vec<Warning>,
}

impl<'de> Deserialize<'de> for Success {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Body {
            #[serde(default)]
            warnings: Vec<Warning>,
        }

        let body = Option::<Body>::deserialize(deserializer)?;
        Ok(Self {
            warnings: body.map(|b| b.warnings).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SiteFunction {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SiteInfo {
    pub sitename: String,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub fullname: String,
    pub lang: String,
    pub userid: i64,
    pub siteurl: String,
    pub userpictureurl: String,
    pub functions: Vec<SiteFunction>,
    pub release: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SignupSettings {
    pub namefields: Vec<String>,
    pub passwordpolicy: Option<String>,
    pub sitepolicy: Option<String>,
    pub defaultcity: Option<String>,
    pub country: Option<String>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub fullname: String,
    pub email: String,
    pub auth: Option<String>,
    pub idnumber: Option<String>,
    pub suspended: Option<bool>,
    pub lang: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Result of `core_user_get_users`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct UserSearch {
    pub users: Vec<User>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedUser {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Role {
    pub roleid: i64,
    pub name: String,
    pub shortname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct EnrolledUser {
    pub id: i64,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub fullname: String,
    pub email: String,
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Course {
    pub id: i64,
    pub shortname: String,
    pub fullname: String,
    pub displayname: Option<String>,
    pub idnumber: Option<String>,
    pub categoryid: Option<i64>,
    pub summary: Option<String>,
    pub format: Option<String>,
    pub startdate: Option<i64>,
    pub enddate: Option<i64>,
    pub visible: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedCourse {
    pub id: i64,
    pub shortname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub idnumber: Option<String>,
    pub description: String,
    pub parent: i64,
    pub coursecount: i64,
    pub visible: Option<i64>,
    pub depth: i64,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Module {
    pub id: i64,
    pub name: String,
    pub modname: String,
    pub url: Option<String>,
    pub visible: Option<i64>,
}

/// One section of `core_course_get_contents`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Section {
    pub id: i64,
    pub name: String,
    pub visible: Option<i64>,
    pub summary: String,
    pub section: i64,
    pub modules: Vec<Module>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Group {
    pub id: i64,
    pub courseid: i64,
    pub name: String,
    pub description: String,
    pub descriptionformat: i64,
    pub enrolmentkey: Option<String>,
    pub idnumber: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub format: Option<i64>,
    pub courseid: Option<i64>,
    pub groupid: Option<i64>,
    pub userid: Option<i64>,
    pub repeatid: Option<i64>,
    pub eventtype: Option<String>,
    pub timestart: i64,
    pub timeduration: i64,
    pub visible: Option<i64>,
    pub sequence: Option<i64>,
}

/// Result of the calendar event calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct CalendarEvents {
    pub events: Vec<Event>,
    pub warnings: Vec<Warning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_accepts_null() {
        let success: Success = serde_json::from_str("null").unwrap();
        assert!(success.warnings.is_empty());
    }

    #[test]
    fn success_accepts_warnings_object() {
        let success: Success = serde_json::from_str(
            r#"{"warnings":[{"item":"course","itemid":4,"warningcode":"nopermission","message":"no"}]}"#,
        )
        .unwrap();
        assert_eq!(success.warnings.len(), 1);
        assert_eq!(success.warnings[0].itemid, Some(4));
    }

    #[test]
    fn sparse_user_deserializes() {
        let user: User = serde_json::from_str(r#"{"id":5,"username":"jdoe","extra":"ignored"}"#).unwrap();
        assert_eq!(user.id, 5);
        assert_eq!(user.username, "jdoe");
        assert!(user.email.is_empty());
        assert!(user.suspended.is_none());
    }

    #[test]
    fn created_user_requires_id() {
        assert!(serde_json::from_str::<CreatedUser>(r#"{"username":"x"}"#).is_err());
    }
}
