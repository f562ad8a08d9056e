//! Registry of remote functions and response formats.
//!
//! # Design
//! `Method` is a closed enum; `as_str` is the only place a wire literal is
//! spelled out. The reverse direction goes through `Method::ALL`, so adding a
//! variant without listing it there is caught by the round-trip test.

use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// A Moodle external function known to this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    AuthEmailGetSignupSettings,
    CoreWebserviceGetSiteInfo,
    CoreUserGetUsers,
    CoreUserGetUsersByField,
    CoreEnrolGetUsersCourses,
    CoreUserCreateUsers,
    CoreUserUpdateUsers,
    CoreUserDeleteUsers,
    CoreRoleAssignRoles,
    CoreRoleUnassignRoles,
    EnrolManualEnrolUsers,
    CoreGroupAddGroupMembers,
    CoreGroupDeleteGroupMembers,
    CoreCourseGetCategories,
    CoreCourseGetCourses,
    CoreCourseGetContents,
    CoreGroupGetGroups,
    CoreGroupGetCourseGroups,
    CoreEnrolGetEnrolledUsers,
    CoreCourseCreateCourses,
    CoreCourseUpdateCourses,
    CoreGradesGetGrades,
    CoreGradesUpdateGrades,
    CoreGradingGetDefinitions,
    CoreCalendarGetCalendarEvents,
    CoreCalendarCreateCalendarEvents,
    CoreCalendarDeleteCalendarEvents,
    CoreGroupCreateGroups,
}

impl Method {
    pub const ALL: [Method; 28] = [
        Method::AuthEmailGetSignupSettings,
        Method::CoreWebserviceGetSiteInfo,
        Method::CoreUserGetUsers,
        Method::CoreUserGetUsersByField,
        Method::CoreEnrolGetUsersCourses,
        Method::CoreUserCreateUsers,
        Method::CoreUserUpdateUsers,
        Method::CoreUserDeleteUsers,
        Method::CoreRoleAssignRoles,
        Method::CoreRoleUnassignRoles,
        Method::EnrolManualEnrolUsers,
        Method::CoreGroupAddGroupMembers,
        Method::CoreGroupDeleteGroupMembers,
        Method::CoreCourseGetCategories,
        Method::CoreCourseGetCourses,
        Method::CoreCourseGetContents,
        Method::CoreGroupGetGroups,
        Method::CoreGroupGetCourseGroups,
        Method::CoreEnrolGetEnrolledUsers,
        Method::CoreCourseCreateCourses,
        Method::CoreCourseUpdateCourses,
        Method::CoreGradesGetGrades,
        Method::CoreGradesUpdateGrades,
        Method::CoreGradingGetDefinitions,
        Method::CoreCalendarGetCalendarEvents,
        Method::CoreCalendarCreateCalendarEvents,
        Method::CoreCalendarDeleteCalendarEvents,
        Method::CoreGroupCreateGroups,
    ];

    /// The `wsfunction` value the server expects for this method.
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::AuthEmailGetSignupSettings => "auth_email_get_signup_settings",
            Method::CoreWebserviceGetSiteInfo => "core_webservice_get_site_info",
            Method::CoreUserGetUsers => "core_user_get_users",
            Method::CoreUserGetUsersByField => "core_user_get_users_by_field",
            Method::CoreEnrolGetUsersCourses => "core_enrol_get_users_courses",
            Method::CoreUserCreateUsers => "core_user_create_users",
            Method::CoreUserUpdateUsers => "core_user_update_users",
            Method::CoreUserDeleteUsers => "core_user_delete_users",
            Method::CoreRoleAssignRoles => "core_role_assign_roles",
            Method::CoreRoleUnassignRoles => "core_role_unassign_roles",
            Method::EnrolManualEnrolUsers => "enrol_manual_enrol_users",
            Method::CoreGroupAddGroupMembers => "core_group_add_group_members",
            Method::CoreGroupDeleteGroupMembers => "core_group_delete_group_members",
            Method::CoreCourseGetCategories => "core_course_get_categories",
            Method::CoreCourseGetCourses => "core_course_get_courses",
            Method::CoreCourseGetContents => "core_course_get_contents",
            Method::CoreGroupGetGroups => "core_group_get_groups",
            Method::CoreGroupGetCourseGroups => "core_group_get_course_groups",
            Method::CoreEnrolGetEnrolledUsers => "core_enrol_get_enrolled_users",
            Method::CoreCourseCreateCourses => "core_course_create_courses",
            Method::CoreCourseUpdateCourses => "core_course_update_courses",
            Method::CoreGradesGetGrades => "core_grades_get_grades",
            Method::CoreGradesUpdateGrades => "core_grades_update_grades",
            Method::CoreGradingGetDefinitions => "core_grading_get_definitions",
            Method::CoreCalendarGetCalendarEvents => "core_calendar_get_calendar_events",
            Method::CoreCalendarCreateCalendarEvents => "core_calendar_create_calendar_events",
            Method::CoreCalendarDeleteCalendarEvents => "core_calendar_delete_calendar_events",
            Method::CoreGroupCreateGroups => "core_group_create_groups",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ApiError::UnknownMethod(s.to_string()))
    }
}

/// Value of the `moodlewsrestformat` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Xml,
}

impl Format {
    pub const fn as_str(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
