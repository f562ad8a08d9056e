//! Per-function convenience calls.
//!
//! Each method only fills in a `Method` and its parameters; transport,
//! parsing and error promotion all happen in `MoodleClient::execute`.

use serde_json::Value;

use crate::client::MoodleClient;
use crate::error::ApiError;
use crate::http::Transport;
use crate::method::Method;
use crate::query::QueryParams;
use crate::requests::{
    CourseUpdate, Enrolment, EventDeletion, EventFilter, GradeQuery, GroupMember, NewCourse, NewEvent, NewGroup,
    NewUser, RoleAssignment, UserUpdate,
};
use crate::response::ApiResponse;
use crate::types::{
    CalendarEvents, Category, Course, CreatedCourse, CreatedUser, EnrolledUser, Group, Section, SignupSettings,
    SiteInfo, Success, User, UserSearch,
};

fn criteria(pairs: &[(&str, &str)]) -> QueryParams {
    let mut params = QueryParams::new();
    for (i, (key, value)) in pairs.iter().enumerate() {
        params.record("criteria", i).field("key", *key).field("value", *value);
    }
    params
}

impl<T: Transport> MoodleClient<T> {
    /// Site, user and capability information for the token's owner.
    /// `service_shortnames` restricts the listed functions to those services.
    pub fn get_site_info(&self, service_shortnames: &[&str]) -> Result<ApiResponse<SiteInfo>, ApiError> {
        let mut params = QueryParams::new();
        params.push_list("serviceshortnames", service_shortnames);
        self.call(Method::CoreWebserviceGetSiteInfo, &params)
    }

    pub fn get_signup_settings(&self) -> Result<ApiResponse<SignupSettings>, ApiError> {
        self.call(Method::AuthEmailGetSignupSettings, &QueryParams::new())
    }

    /// Search users; criteria are `(key, value)` pairs combined with AND.
    pub fn get_users(&self, search: &[(&str, &str)]) -> Result<ApiResponse<UserSearch>, ApiError> {
        self.call(Method::CoreUserGetUsers, &criteria(search))
    }

    /// Look users up by a unique field (`id`, `idnumber`, `username`, `email`).
    pub fn get_users_by_field(&self, field: &str, values: &[&str]) -> Result<ApiResponse<Vec<User>>, ApiError> {
        let mut params = QueryParams::new();
        params.push("field", field).push_list("values", values);
        self.call(Method::CoreUserGetUsersByField, &params)
    }

    pub fn get_user_courses(&self, userid: i64) -> Result<ApiResponse<Vec<Course>>, ApiError> {
        let mut params = QueryParams::new();
        params.push("userid", userid);
        self.call(Method::CoreEnrolGetUsersCourses, &params)
    }

    pub fn create_users(&self, users: &[NewUser]) -> Result<ApiResponse<Vec<CreatedUser>>, ApiError> {
        let mut params = QueryParams::new();
        params.push_records("users", users);
        self.call(Method::CoreUserCreateUsers, &params)
    }

    pub fn update_users(&self, users: &[UserUpdate]) -> Result<ApiResponse<Success>, ApiError> {
        let mut params = QueryParams::new();
        params.push_records("users", users);
        self.call(Method::CoreUserUpdateUsers, &params)
    }

    pub fn delete_users(&self, userids: &[i64]) -> Result<ApiResponse<Success>, ApiError> {
        let mut params = QueryParams::new();
        params.push_list("userids", userids);
        self.call(Method::CoreUserDeleteUsers, &params)
    }

    pub fn assign_roles(&self, assignments: &[RoleAssignment]) -> Result<ApiResponse<Success>, ApiError> {
        let mut params = QueryParams::new();
        params.push_records("assignments", assignments);
        self.call(Method::CoreRoleAssignRoles, &params)
    }

    pub fn unassign_roles(&self, unassignments: &[RoleAssignment]) -> Result<ApiResponse<Success>, ApiError> {
        let mut params = QueryParams::new();
        params.push_records("unassignments", unassignments);
        self.call(Method::CoreRoleUnassignRoles, &params)
    }

    /// Manual enrolment; requires the manual enrolment plugin on the course.
    pub fn enrol_users(&self, enrolments: &[Enrolment]) -> Result<ApiResponse<Success>, ApiError> {
        let mut params = QueryParams::new();
        params.push_records("enrolments", enrolments);
        self.call(Method::EnrolManualEnrolUsers, &params)
    }

    pub fn add_group_members(&self, members: &[GroupMember]) -> Result<ApiResponse<Success>, ApiError> {
        let mut params = QueryParams::new();
        params.push_records("members", members);
        self.call(Method::CoreGroupAddGroupMembers, &params)
    }

    pub fn delete_group_members(&self, members: &[GroupMember]) -> Result<ApiResponse<Success>, ApiError> {
        let mut params = QueryParams::new();
        params.push_records("members", members);
        self.call(Method::CoreGroupDeleteGroupMembers, &params)
    }

    /// `addsubcategories` defaults to true on the server when `None`.
    pub fn get_categories(
        &self,
        search: &[(&str, &str)],
        addsubcategories: Option<bool>,
    ) -> Result<ApiResponse<Vec<Category>>, ApiError> {
        let mut params = criteria(search);
        params.push_opt("addsubcategories", addsubcategories);
        self.call(Method::CoreCourseGetCategories, &params)
    }

    /// Courses by id; an empty slice returns every course.
    pub fn get_courses(&self, ids: &[i64]) -> Result<ApiResponse<Vec<Course>>, ApiError> {
        let mut params = QueryParams::new();
        params.push_list("options[ids]", ids);
        self.call(Method::CoreCourseGetCourses, &params)
    }

    pub fn get_contents(&self, courseid: i64) -> Result<ApiResponse<Vec<Section>>, ApiError> {
        let mut params = QueryParams::new();
        params.push("courseid", courseid);
        self.call(Method::CoreCourseGetContents, &params)
    }

    pub fn get_groups(&self, groupids: &[i64]) -> Result<ApiResponse<Vec<Group>>, ApiError> {
        let mut params = QueryParams::new();
        params.push_list("groupids", groupids);
        self.call(Method::CoreGroupGetGroups, &params)
    }

    pub fn get_course_groups(&self, courseid: i64) -> Result<ApiResponse<Vec<Group>>, ApiError> {
        let mut params = QueryParams::new();
        params.push("courseid", courseid);
        self.call(Method::CoreGroupGetCourseGroups, &params)
    }

    pub fn get_enrolled_users(&self, courseid: i64) -> Result<ApiResponse<Vec<EnrolledUser>>, ApiError> {
        let mut params = QueryParams::new();
        params.push("courseid", courseid);
        self.call(Method::CoreEnrolGetEnrolledUsers, &params)
    }

    pub fn create_courses(&self, courses: &[NewCourse]) -> Result<ApiResponse<Vec<CreatedCourse>>, ApiError> {
        let mut params = QueryParams::new();
        params.push_records("courses", courses);
        self.call(Method::CoreCourseCreateCourses, &params)
    }

    pub fn update_courses(&self, courses: &[CourseUpdate]) -> Result<ApiResponse<Success>, ApiError> {
        let mut params = QueryParams::new();
        params.push_records("courses", courses);
        self.call(Method::CoreCourseUpdateCourses, &params)
    }

    /// The grades payload varies with the site version and is returned
    /// untyped.
    pub fn get_grades(&self, query: &GradeQuery) -> Result<ApiResponse<Value>, ApiError> {
        self.call(Method::CoreGradesGetGrades, &query.to_params())
    }

    pub fn get_calendar_events(&self, filter: &EventFilter) -> Result<ApiResponse<CalendarEvents>, ApiError> {
        self.call(Method::CoreCalendarGetCalendarEvents, &filter.to_params())
    }

    pub fn create_calendar_events(&self, events: &[NewEvent]) -> Result<ApiResponse<CalendarEvents>, ApiError> {
        let mut params = QueryParams::new();
        params.push_records("events", events);
        self.call(Method::CoreCalendarCreateCalendarEvents, &params)
    }

    pub fn delete_calendar_events(&self, events: &[EventDeletion]) -> Result<ApiResponse<Success>, ApiError> {
        let mut params = QueryParams::new();
        params.push_records("events", events);
        self.call(Method::CoreCalendarDeleteCalendarEvents, &params)
    }

    pub fn create_groups(&self, groups: &[NewGroup]) -> Result<ApiResponse<Vec<Group>>, ApiError> {
        let mut params = QueryParams::new();
        params.push_records("groups", groups);
        self.call(Method::CoreGroupCreateGroups, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{configured, query_pairs, CannedTransport};
    use crate::response::Status;

    fn sent(transport: &CannedTransport) -> Vec<(String, String)> {
        query_pairs(&transport.last_url()).into_iter().skip(3).collect()
    }

    fn wsfunction(transport: &CannedTransport) -> String {
        query_pairs(&transport.last_url())[1].1.clone()
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn site_info_without_services_sends_no_parameters() {
        let client = configured(CannedTransport::new(
            r#"{"sitename":"Campus","username":"admin","userid":2,"functions":[{"name":"core_user_get_users","version":"2024"}]}"#,
        ));
        let info = client.get_site_info(&[]).unwrap().into_data().unwrap();
        assert_eq!(info.sitename, "Campus");
        assert_eq!(info.functions.len(), 1);
        assert_eq!(wsfunction(client.transport()), "core_webservice_get_site_info");
        assert!(sent(client.transport()).is_empty());

        client.get_site_info(&["moodle_mobile_app"]).unwrap();
        assert_eq!(sent(client.transport()), vec![pair("serviceshortnames[0]", "moodle_mobile_app")]);
    }

    #[test]
    fn get_users_indexes_every_criterion() {
        let client = configured(CannedTransport::new(r#"{"users":[{"id":3,"username":"ann"}],"warnings":[]}"#));
        let search = client
            .get_users(&[("lastname", "Smith"), ("auth", "manual")])
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(search.users[0].username, "ann");
        assert_eq!(
            sent(client.transport()),
            vec![
                pair("criteria[0][key]", "lastname"),
                pair("criteria[0][value]", "Smith"),
                pair("criteria[1][key]", "auth"),
                pair("criteria[1][value]", "manual"),
            ]
        );
    }

    #[test]
    fn get_users_by_field_sends_field_and_values() {
        let client = configured(CannedTransport::new(r#"[{"id":1,"username":"a"},{"id":2,"username":"b"}]"#));
        let users = client.get_users_by_field("username", &["a", "b"]).unwrap().into_data().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(
            sent(client.transport()),
            vec![pair("field", "username"), pair("values[0]", "a"), pair("values[1]", "b")]
        );
    }

    #[test]
    fn delete_users_accepts_null() {
        let client = configured(CannedTransport::new("null"));
        let response = client.delete_users(&[7, 8]).unwrap();
        assert_eq!(response.status(), Status::Success);
        assert_eq!(wsfunction(client.transport()), "core_user_delete_users");
        assert_eq!(sent(client.transport()), vec![pair("userids[0]", "7"), pair("userids[1]", "8")]);
    }

    #[test]
    fn assign_roles_omits_unset_context() {
        let client = configured(CannedTransport::new("null"));
        client
            .assign_roles(&[RoleAssignment {
                roleid: 5,
                userid: 9,
                contextid: Some(1),
                ..RoleAssignment::default()
            }])
            .unwrap();
        assert_eq!(
            sent(client.transport()),
            vec![
                pair("assignments[0][roleid]", "5"),
                pair("assignments[0][userid]", "9"),
                pair("assignments[0][contextid]", "1"),
            ]
        );
    }

    #[test]
    fn get_courses_filters_by_ids() {
        let client = configured(CannedTransport::new(r#"[{"id":4,"shortname":"BIO","fullname":"Biology"}]"#));
        let courses = client.get_courses(&[4]).unwrap().into_data().unwrap();
        assert_eq!(courses[0].fullname, "Biology");
        assert_eq!(sent(client.transport()), vec![pair("options[ids][0]", "4")]);
    }

    #[test]
    fn get_categories_sends_addsubcategories_only_when_set() {
        let client = configured(CannedTransport::new("[]"));
        client.get_categories(&[("id", "3")], None).unwrap();
        assert!(!sent(client.transport()).iter().any(|(k, _)| k == "addsubcategories"));

        client.get_categories(&[("id", "3")], Some(false)).unwrap();
        assert!(sent(client.transport()).contains(&pair("addsubcategories", "0")));
    }

    #[test]
    fn create_calendar_events_parses_events() {
        let client = configured(CannedTransport::new(
            r#"{"events":[{"id":11,"name":"Exam","timestart":1709294400,"timeduration":7200}],"warnings":[]}"#,
        ));
        let events = client
            .create_calendar_events(&[NewEvent::new("Exam")])
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(events.events[0].timeduration, 7200);
        assert_eq!(sent(client.transport()), vec![pair("events[0][name]", "Exam")]);
    }

    #[test]
    fn grades_are_untyped() {
        let client = configured(CannedTransport::new(r#"{"items":[],"outcomes":[]}"#));
        let grades = client
            .get_grades(&GradeQuery {
                courseid: 2,
                ..GradeQuery::default()
            })
            .unwrap()
            .into_data()
            .unwrap();
        assert!(grades["items"].as_array().unwrap().is_empty());
    }

    #[test]
    fn convenience_calls_share_error_promotion() {
        let client = configured(CannedTransport::new(
            r#"{"exception":"invalid_parameter_exception","errorcode":"invalidparameter","message":"Invalid parameter value detected"}"#,
        ));
        let err = client.get_contents(0).unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter { .. }));
    }
}
