//! SurrealDB implementation of [`ProfileRepository`].
//!
//! Role-specific fields live in optional columns on the `profile` table.
//! Which columns must be present follows from `role`; the row conversion
//! enforces that and rebuilds the typed [`RoleDetails`].

use chrono::{DateTime, Utc};
use outpass_core::error::OutpassResult;
use outpass_core::models::profile::{
    ApprovalStatus, ChildLink, CreateProfile, Decision, Relationship, Role, RoleDetails, Shift,
    UserProfile, Verdict,
};
use outpass_core::repository::ProfileRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct ProfileRow {
    role: String,
    status: String,
    full_name: String,
    email: String,
    phone: String,
    username: String,
    student_id: Option<String>,
    room_number: Option<String>,
    course: Option<String>,
    year: Option<String>,
    parent_contact: Option<String>,
    child_student_id: Option<String>,
    relationship: Option<String>,
    linked_child: Option<String>,
    child_name: Option<String>,
    employee_id: Option<String>,
    shift: Option<String>,
    department: Option<String>,
    access_code: Option<String>,
    decided_at: Option<DateTime<Utc>>,
    decided_by: Option<String>,
    created_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ProfileRowWithId {
    record_id: String,
    role: String,
    status: String,
    full_name: String,
    email: String,
    phone: String,
    username: String,
    student_id: Option<String>,
    room_number: Option<String>,
    course: Option<String>,
    year: Option<String>,
    parent_contact: Option<String>,
    child_student_id: Option<String>,
    relationship: Option<String>,
    linked_child: Option<String>,
    child_name: Option<String>,
    employee_id: Option<String>,
    shift: Option<String>,
    department: Option<String>,
    access_code: Option<String>,
    decided_at: Option<DateTime<Utc>>,
    decided_by: Option<String>,
    created_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

pub(crate) fn parse_role(s: &str) -> Result<Role, DbError> {
    match s {
        "student" => Ok(Role::Student),
        "parent" => Ok(Role::Parent),
        "security" => Ok(Role::Security),
        "warden" => Ok(Role::Warden),
        "admin" => Ok(Role::Admin),
        other => Err(DbError::Decode(format!("unknown role: {other}"))),
    }
}

pub(crate) fn role_to_string(role: &Role) -> &'static str {
    match role {
        Role::Student => "student",
        Role::Parent => "parent",
        Role::Security => "security",
        Role::Warden => "warden",
        Role::Admin => "admin",
    }
}

pub(crate) fn parse_status(s: &str) -> Result<ApprovalStatus, DbError> {
    match s {
        "pending" => Ok(ApprovalStatus::Pending),
        "approved" => Ok(ApprovalStatus::Approved),
        "rejected" => Ok(ApprovalStatus::Rejected),
        other => Err(DbError::Decode(format!("unknown status: {other}"))),
    }
}

pub(crate) fn status_to_string(status: &ApprovalStatus) -> &'static str {
    match status {
        ApprovalStatus::Pending => "pending",
        ApprovalStatus::Approved => "approved",
        ApprovalStatus::Rejected => "rejected",
    }
}

pub(crate) fn verdict_to_string(verdict: &Verdict) -> &'static str {
    match verdict {
        Verdict::Approved => "approved",
        Verdict::Rejected => "rejected",
    }
}

fn parse_relationship(s: &str) -> Result<Relationship, DbError> {
    match s {
        "father" => Ok(Relationship::Father),
        "mother" => Ok(Relationship::Mother),
        "guardian" => Ok(Relationship::Guardian),
        other => Err(DbError::Decode(format!("unknown relationship: {other}"))),
    }
}

fn relationship_to_string(r: &Relationship) -> &'static str {
    match r {
        Relationship::Father => "father",
        Relationship::Mother => "mother",
        Relationship::Guardian => "guardian",
    }
}

fn parse_shift(s: &str) -> Result<Shift, DbError> {
    match s {
        "morning" => Ok(Shift::Morning),
        "evening" => Ok(Shift::Evening),
        "night" => Ok(Shift::Night),
        other => Err(DbError::Decode(format!("unknown shift: {other}"))),
    }
}

fn shift_to_string(s: &Shift) -> &'static str {
    match s {
        Shift::Morning => "morning",
        Shift::Evening => "evening",
        Shift::Night => "night",
    }
}

fn require(field: Option<String>, name: &str) -> Result<String, DbError> {
    field.ok_or_else(|| DbError::Decode(format!("profile column {name} is unset")))
}

pub(crate) fn parse_decision(
    decided_at: Option<DateTime<Utc>>,
    decided_by: Option<String>,
) -> Result<Option<Decision>, DbError> {
    match (decided_at, decided_by) {
        (Some(at), Some(by)) => {
            let decided_by = Uuid::parse_str(&by)
                .map_err(|e| DbError::Decode(format!("invalid decided_by UUID: {e}")))?;
            Ok(Some(Decision {
                decided_at: at,
                decided_by,
            }))
        }
        (None, None) => Ok(None),
        _ => Err(DbError::Decode(
            "decided_at and decided_by must be set together".into(),
        )),
    }
}

impl ProfileRow {
    fn into_profile(self, id: Uuid) -> Result<UserProfile, DbError> {
        let role = parse_role(&self.role)?;
        let details = match role {
            Role::Student => RoleDetails::Student {
                student_id: require(self.student_id, "student_id")?,
                room_number: require(self.room_number, "room_number")?,
                course: require(self.course, "course")?,
                year: require(self.year, "year")?,
                parent_contact: require(self.parent_contact, "parent_contact")?,
            },
            Role::Parent => RoleDetails::Parent {
                child_student_id: require(self.child_student_id.clone(), "child_student_id")?,
                relationship: parse_relationship(&require(self.relationship, "relationship")?)?,
            },
            Role::Security => RoleDetails::Security {
                employee_id: require(self.employee_id, "employee_id")?,
                shift: parse_shift(&require(self.shift, "shift")?)?,
            },
            Role::Warden => RoleDetails::Warden {
                employee_id: require(self.employee_id, "employee_id")?,
                department: require(self.department, "department")?,
            },
            Role::Admin => RoleDetails::Admin {
                access_code: require(self.access_code, "access_code")?,
            },
        };

        let linked_child = match self.linked_child {
            Some(raw) => {
                let profile_id = Uuid::parse_str(&raw)
                    .map_err(|e| DbError::Decode(format!("invalid linked_child UUID: {e}")))?;
                Some(ChildLink {
                    profile_id,
                    name: require(self.child_name, "child_name")?,
                    student_id: require(self.child_student_id, "child_student_id")?,
                })
            }
            None => None,
        };

        Ok(UserProfile {
            id,
            role,
            status: parse_status(&self.status)?,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            username: self.username,
            details,
            linked_child,
            decision: parse_decision(self.decided_at, self.decided_by)?,
            created_at: self.created_at,
            last_login: self.last_login,
        })
    }
}

impl ProfileRowWithId {
    fn try_into_profile(self) -> Result<UserProfile, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let row = ProfileRow {
            role: self.role,
            status: self.status,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            username: self.username,
            student_id: self.student_id,
            room_number: self.room_number,
            course: self.course,
            year: self.year,
            parent_contact: self.parent_contact,
            child_student_id: self.child_student_id,
            relationship: self.relationship,
            linked_child: self.linked_child,
            child_name: self.child_name,
            employee_id: self.employee_id,
            shift: self.shift,
            department: self.department,
            access_code: self.access_code,
            decided_at: self.decided_at,
            decided_by: self.decided_by,
            created_at: self.created_at,
            last_login: self.last_login,
        };
        row.into_profile(id)
    }
}

/// SurrealDB implementation of the profile repository.
#[derive(Clone)]
pub struct SurrealProfileRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProfileRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProfileRepository for SurrealProfileRepository<C> {
    async fn create(&self, input: CreateProfile) -> OutpassResult<UserProfile> {
        let id = input.id;
        let id_str = id.to_string();
        let role = input.details.role();
        let status = role.initial_status();

        let mut sets = vec![
            "role = $role",
            "status = $status",
            "full_name = $full_name",
            "email = $email",
            "phone = $phone",
            "username = $username",
        ];
        // Only the columns for this role are written; the rest stay unset.
        let mut detail_binds: Vec<(&'static str, String)> = Vec::new();
        match input.details {
            RoleDetails::Student {
                student_id,
                room_number,
                course,
                year,
                parent_contact,
            } => {
                sets.extend([
                    "student_id = $student_id",
                    "room_number = $room_number",
                    "course = $course",
                    "year = $year",
                    "parent_contact = $parent_contact",
                ]);
                detail_binds.push(("student_id", student_id));
                detail_binds.push(("room_number", room_number));
                detail_binds.push(("course", course));
                detail_binds.push(("year", year));
                detail_binds.push(("parent_contact", parent_contact));
            }
            RoleDetails::Parent {
                child_student_id,
                relationship,
            } => {
                sets.extend([
                    "child_student_id = $child_student_id",
                    "relationship = $relationship",
                ]);
                detail_binds.push(("child_student_id", child_student_id));
                detail_binds.push((
                    "relationship",
                    relationship_to_string(&relationship).to_string(),
                ));
            }
            RoleDetails::Security { employee_id, shift } => {
                sets.extend(["employee_id = $employee_id", "shift = $shift"]);
                detail_binds.push(("employee_id", employee_id));
                detail_binds.push(("shift", shift_to_string(&shift).to_string()));
            }
            RoleDetails::Warden {
                employee_id,
                department,
            } => {
                sets.extend(["employee_id = $employee_id", "department = $department"]);
                detail_binds.push(("employee_id", employee_id));
                detail_binds.push(("department", department));
            }
            RoleDetails::Admin { access_code } => {
                sets.push("access_code = $access_code");
                detail_binds.push(("access_code", access_code));
            }
        }

        let query = format!(
            "CREATE type::record('profile', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("role", role_to_string(&role).to_string()))
            .bind(("status", status_to_string(&status).to_string()))
            .bind(("full_name", input.full_name))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .bind(("username", input.username));
        for (key, value) in detail_binds {
            builder = builder.bind((key, value));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "profile".into(),
            id: id_str,
        })?;

        Ok(row.into_profile(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> OutpassResult<UserProfile> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('profile', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "profile".into(),
            id: id_str,
        })?;

        Ok(row.into_profile(id)?)
    }

    async fn get_by_username(&self, username: &str) -> OutpassResult<UserProfile> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM profile \
                 WHERE username = $username",
            )
            .bind(("username", username.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "profile".into(),
            id: format!("username={username}"),
        })?;

        Ok(row.try_into_profile()?)
    }

    async fn find_student(&self, student_id: &str) -> OutpassResult<UserProfile> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM profile \
                 WHERE role = 'student' AND student_id = $student_id \
                 LIMIT 1",
            )
            .bind(("student_id", student_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "profile".into(),
            id: format!("student_id={student_id}"),
        })?;

        Ok(row.try_into_profile()?)
    }

    async fn list_pending(&self) -> OutpassResult<Vec<UserProfile>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM profile \
                 WHERE status = 'pending' ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRowWithId> = result.take(0).map_err(DbError::from)?;
        let profiles = rows
            .into_iter()
            .map(|row| row.try_into_profile())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(profiles)
    }

    async fn decide(&self, id: Uuid, verdict: Verdict, decided_by: Uuid) -> OutpassResult<UserProfile> {
        let id_str = id.to_string();

        // Conditional transition: only a still-pending profile is updated,
        // so repeat or racing decisions fall through to NotFound.
        let result = self
            .db
            .query(
                "UPDATE type::record('profile', $id) SET \
                 status = $status, \
                 decided_at = time::now(), \
                 decided_by = $decided_by \
                 WHERE status = 'pending'",
            )
            .bind(("id", id_str.clone()))
            .bind(("status", verdict_to_string(&verdict).to_string()))
            .bind(("decided_by", decided_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "profile".into(),
            id: id_str,
        })?;

        Ok(row.into_profile(id)?)
    }

    async fn link_child(&self, parent_id: Uuid, link: ChildLink) -> OutpassResult<UserProfile> {
        let id_str = parent_id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('profile', $id) SET \
                 linked_child = $linked_child, \
                 child_name = $child_name, \
                 child_student_id = $child_student_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("linked_child", link.profile_id.to_string()))
            .bind(("child_name", link.name))
            .bind(("child_student_id", link.student_id))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "profile".into(),
            id: id_str,
        })?;

        Ok(row.into_profile(parent_id)?)
    }

    async fn touch_last_login(&self, id: Uuid) -> OutpassResult<()> {
        let id_str = id.to_string();

        self.db
            .query("UPDATE type::record('profile', $id) SET last_login = time::now()")
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn count(
        &self,
        role: Option<Role>,
        status: Option<ApprovalStatus>,
    ) -> OutpassResult<u64> {
        let mut conds = Vec::new();
        if role.is_some() {
            conds.push("role = $role");
        }
        if status.is_some() {
            conds.push("status = $status");
        }
        let where_clause = if conds.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conds.join(" AND "))
        };

        let query = format!("SELECT count() AS total FROM profile{where_clause} GROUP ALL");

        let mut builder = self.db.query(&query);
        if let Some(ref role) = role {
            builder = builder.bind(("role", role_to_string(role).to_string()));
        }
        if let Some(ref status) = status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
