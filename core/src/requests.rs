//! Request inputs for the convenience operations.
//!
//! # Design
//! Each struct describes one indexed record (`users[i]`, `courses[i]`, ...).
//! Required fields are plain values, optional ones are `Option`s that write
//! nothing when `None`. Because a whole record is one struct, every field of
//! element `i` is written under the same index.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::query::{QueryParams, Record, ToRecord};

/// A `(type, value)` pair under `preferences` or `customfields`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedValue {
    pub kind: String,
    pub value: String,
}

impl TypedValue {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

fn write_typed_values(record: &mut Record<'_>, name: &str, values: &[TypedValue]) {
    for (i, item) in values.iter().enumerate() {
        record
            .nested(name, i)
            .field("type", item.kind.as_str())
            .field("value", item.value.as_str());
    }
}

/// Optional profile fields shared by user creation and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub auth: Option<String>,
    pub idnumber: Option<String>,
    pub lang: Option<String>,
    pub calendartype: Option<String>,
    pub theme: Option<String>,
    pub timezone: Option<String>,
    pub mailformat: Option<i32>,
    pub description: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub firstnamephonetic: Option<String>,
    pub lastnamephonetic: Option<String>,
    pub middlename: Option<String>,
    pub alternatename: Option<String>,
    pub preferences: Vec<TypedValue>,
    pub customfields: Vec<TypedValue>,
}

impl ToRecord for UserProfile {
    fn write_fields(&self, record: &mut Record<'_>) {
        record
            .opt_field("auth", self.auth.as_deref())
            .opt_field("idnumber", self.idnumber.as_deref())
            .opt_field("lang", self.lang.as_deref())
            .opt_field("calendartype", self.calendartype.as_deref())
            .opt_field("theme", self.theme.as_deref())
            .opt_field("timezone", self.timezone.as_deref())
            .opt_field("mailformat", self.mailformat)
            .opt_field("description", self.description.as_deref())
            .opt_field("city", self.city.as_deref())
            .opt_field("country", self.country.as_deref())
            .opt_field("firstnamephonetic", self.firstnamephonetic.as_deref())
            .opt_field("lastnamephonetic", self.lastnamephonetic.as_deref())
            .opt_field("middlename", self.middlename.as_deref())
            .opt_field("alternatename", self.alternatename.as_deref());
        write_typed_values(record, "preferences", &self.preferences);
        write_typed_values(record, "customfields", &self.customfields);
    }
}

/// Input record for `core_user_create_users`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub profile: UserProfile,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            firstname: firstname.into(),
            lastname: lastname.into(),
            email: email.into(),
            profile: UserProfile::default(),
        }
    }
}

impl ToRecord for NewUser {
    fn write_fields(&self, record: &mut Record<'_>) {
        record
            .field("username", self.username.as_str())
            .field("password", self.password.as_str())
            .field("firstname", self.firstname.as_str())
            .field("lastname", self.lastname.as_str())
            .field("email", self.email.as_str());
        self.profile.write_fields(record);
    }
}

/// Input record for `core_user_update_users`; only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub id: i64,
    pub username: Option<String>,
    pub password: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub suspended: Option<bool>,
    pub profile: UserProfile,
}

impl ToRecord for UserUpdate {
    fn write_fields(&self, record: &mut Record<'_>) {
        record
            .field("id", self.id)
            .opt_field("username", self.username.as_deref())
            .opt_field("password", self.password.as_deref())
            .opt_field("firstname", self.firstname.as_deref())
            .opt_field("lastname", self.lastname.as_deref())
            .opt_field("email", self.email.as_deref())
            .opt_field("suspended", self.suspended);
        self.profile.write_fields(record);
    }
}

/// Input record for `core_role_assign_roles` and `core_role_unassign_roles`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAssignment {
    pub roleid: i64,
    pub userid: i64,
    pub contextid: Option<i64>,
    pub contextlevel: Option<String>,
    pub instanceid: Option<i64>,
}

impl ToRecord for RoleAssignment {
    fn write_fields(&self, record: &mut Record<'_>) {
        record
            .field("roleid", self.roleid)
            .field("userid", self.userid)
            .opt_field("contextid", self.contextid)
            .opt_field("contextlevel", self.contextlevel.as_deref())
            .opt_field("instanceid", self.instanceid);
    }
}

/// Input record for `enrol_manual_enrol_users`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrolment {
    pub roleid: i64,
    pub userid: i64,
    pub courseid: i64,
    pub timestart: Option<DateTime<Utc>>,
    pub timeend: Option<DateTime<Utc>>,
    pub suspend: Option<bool>,
}

impl ToRecord for Enrolment {
    fn write_fields(&self, record: &mut Record<'_>) {
        record
            .field("roleid", self.roleid)
            .field("userid", self.userid)
            .field("courseid", self.courseid)
            .instant_field("timestart", self.timestart.as_ref())
            .instant_field("timeend", self.timeend.as_ref())
            .opt_field("suspend", self.suspend);
    }
}

/// Input record for the group membership calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupMember {
    pub groupid: i64,
    pub userid: i64,
}

impl ToRecord for GroupMember {
    fn write_fields(&self, record: &mut Record<'_>) {
        record.field("groupid", self.groupid).field("userid", self.userid);
    }
}

/// Optional course settings shared by creation and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseSettings {
    pub idnumber: Option<String>,
    pub summary: Option<String>,
    pub summaryformat: Option<i32>,
    pub format: Option<String>,
    pub showgrades: Option<bool>,
    pub newsitems: Option<i32>,
    pub startdate: Option<DateTime<Utc>>,
    pub enddate: Option<DateTime<Utc>>,
    pub numsections: Option<i32>,
    pub maxbytes: Option<i64>,
    pub showreports: Option<bool>,
    pub visible: Option<bool>,
    pub hiddensections: Option<i32>,
    pub groupmode: Option<i32>,
    pub groupmodeforce: Option<bool>,
    pub defaultgroupingid: Option<i64>,
    pub enablecompletion: Option<bool>,
    pub completionnotify: Option<bool>,
    pub lang: Option<String>,
    pub forcetheme: Option<String>,
}

impl ToRecord for CourseSettings {
    fn write_fields(&self, record: &mut Record<'_>) {
        record
            .opt_field("idnumber", self.idnumber.as_deref())
            .opt_field("summary", self.summary.as_deref())
            .opt_field("summaryformat", self.summaryformat)
            .opt_field("format", self.format.as_deref())
            .opt_field("showgrades", self.showgrades)
            .opt_field("newsitems", self.newsitems)
            .instant_field("startdate", self.startdate.as_ref())
            .instant_field("enddate", self.enddate.as_ref())
            .opt_field("numsections", self.numsections)
            .opt_field("maxbytes", self.maxbytes)
            .opt_field("showreports", self.showreports)
            .opt_field("visible", self.visible)
            .opt_field("hiddensections", self.hiddensections)
            .opt_field("groupmode", self.groupmode)
            .opt_field("groupmodeforce", self.groupmodeforce)
            .opt_field("defaultgroupingid", self.defaultgroupingid)
            .opt_field("enablecompletion", self.enablecompletion)
            .opt_field("completionnotify", self.completionnotify)
            .opt_field("lang", self.lang.as_deref())
            .opt_field("forcetheme", self.forcetheme.as_deref());
    }
}

/// Input record for `core_course_create_courses`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCourse {
    pub fullname: String,
    pub shortname: String,
    pub categoryid: i64,
    pub settings: CourseSettings,
}

impl NewCourse {
    pub fn new(fullname: impl Into<String>, shortname: impl Into<String>, categoryid: i64) -> Self {
        Self {
            fullname: fullname.into(),
            shortname: shortname.into(),
            categoryid,
            settings: CourseSettings::default(),
        }
    }
}

impl ToRecord for NewCourse {
    fn write_fields(&self, record: &mut Record<'_>) {
        record
            .field("fullname", self.fullname.as_str())
            .field("shortname", self.shortname.as_str())
            .field("categoryid", self.categoryid);
        self.settings.write_fields(record);
    }
}

/// Input record for `core_course_update_courses`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseUpdate {
    pub id: i64,
    pub fullname: Option<String>,
    pub shortname: Option<String>,
    pub categoryid: Option<i64>,
    pub settings: CourseSettings,
}

impl ToRecord for CourseUpdate {
    fn write_fields(&self, record: &mut Record<'_>) {
        record
            .field("id", self.id)
            .opt_field("fullname", self.fullname.as_deref())
            .opt_field("shortname", self.shortname.as_deref())
            .opt_field("categoryid", self.categoryid);
        self.settings.write_fields(record);
    }
}

/// Filter for `core_grades_get_grades`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeQuery {
    pub courseid: i64,
    pub component: Option<String>,
    pub activityid: Option<i64>,
    pub userids: Vec<i64>,
}

impl GradeQuery {
    pub(crate) fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push("courseid", self.courseid)
            .push_opt("component", self.component.as_deref())
            .push_opt("activityid", self.activityid)
            .push_list("userids", &self.userids);
        params
    }
}

/// Filter for `core_calendar_get_calendar_events`. Empty lists are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub eventids: Vec<i64>,
    pub courseids: Vec<i64>,
    pub groupids: Vec<i64>,
}

impl EventFilter {
    pub(crate) fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push_list("events[eventids]", &self.eventids)
            .push_list("events[courseids]", &self.courseids)
            .push_list("events[groupids]", &self.groupids);
        params
    }
}

/// Input record for `core_calendar_create_calendar_events`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub format: Option<i32>,
    pub courseid: Option<i64>,
    pub groupid: Option<i64>,
    pub repeats: Option<i32>,
    pub eventtype: Option<String>,
    pub timestart: Option<DateTime<Utc>>,
    pub timeduration: Option<Duration>,
    pub visible: Option<bool>,
    pub sequence: Option<i32>,
}

impl NewEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl ToRecord for NewEvent {
    fn write_fields(&self, record: &mut Record<'_>) {
        record
            .field("name", self.name.as_str())
            .opt_field("description", self.description.as_deref())
            .opt_field("format", self.format)
            .opt_field("courseid", self.courseid)
            .opt_field("groupid", self.groupid)
            .opt_field("repeats", self.repeats)
            .opt_field("eventtype", self.eventtype.as_deref())
            .instant_field("timestart", self.timestart.as_ref())
            .duration_field("timeduration", self.timeduration)
            .opt_field("visible", self.visible)
            .opt_field("sequence", self.sequence);
    }
}

/// Input record for `core_calendar_delete_calendar_events`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventDeletion {
    pub eventid: i64,
    /// Also delete the other events of the series.
    pub repeat: bool,
}

impl ToRecord for EventDeletion {
    fn write_fields(&self, record: &mut Record<'_>) {
        record.field("eventid", self.eventid).field("repeat", self.repeat);
    }
}

/// Input record for `core_group_create_groups`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewGroup {
    pub courseid: i64,
    pub name: String,
    pub description: String,
    pub descriptionformat: Option<i32>,
    pub enrolmentkey: Option<String>,
    pub idnumber: Option<String>,
}

impl ToRecord for NewGroup {
    fn write_fields(&self, record: &mut Record<'_>) {
        record
            .field("courseid", self.courseid)
            .field("name", self.name.as_str())
            .field("description", self.description.as_str())
            .opt_field("descriptionformat", self.descriptionformat)
            .opt_field("enrolmentkey", self.enrolmentkey.as_deref())
            .opt_field("idnumber", self.idnumber.as_deref());
    }
}
