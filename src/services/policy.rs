//! Role-based access rules for dashboard resources.
//!
//! Everything here is pure: the same role and resource always produce the
//! same answer, with no I/O. "Own class only" is reported as
//! [`Permission::OwnClass`]; resolving which class a homeroom teacher owns is
//! left to the data views.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::models::user::Role;

/// A guarded dashboard resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum Resource {
    Students,
    Teachers,
    Classes,
    Subjects,
    Extracurriculars,
    LearningObjectives,
    SubjectScores,
    ObjectiveAchievements,
    ExtracurricularScores,
    Attendance,
    GradeStatus,
    GradeLedger,
    ReportCards,
    HomeroomNotes,
    SchoolSettings,
    AcademicYears,
}

/// How a resource is shared between roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ResourceGroup {
    /// Per-student records, scoped to a class for homeroom teachers.
    StudentScoped,
    /// Teacher master data.
    TeacherData,
    /// School-wide administration.
    Administration,
    /// Reference lists everyone may read.
    SharedCatalog,
}

impl Resource {
    pub const ALL: [Resource; 16] = [
        Resource::Students,
        Resource::Teachers,
        Resource::Classes,
        Resource::Subjects,
        Resource::Extracurriculars,
        Resource::LearningObjectives,
        Resource::SubjectScores,
        Resource::ObjectiveAchievements,
        Resource::ExtracurricularScores,
        Resource::Attendance,
        Resource::GradeStatus,
        Resource::GradeLedger,
        Resource::ReportCards,
        Resource::HomeroomNotes,
        Resource::SchoolSettings,
        Resource::AcademicYears,
    ];

    /// The stable tag used by the view layer.
    pub fn tag(self) -> &'static str {
        match self {
            Resource::Students => "manage-students",
            Resource::Teachers => "manage-teachers",
            Resource::Classes => "manage-classes",
            Resource::Subjects => "manage-subjects",
            Resource::Extracurriculars => "manage-extracurriculars",
            Resource::LearningObjectives => "learning-objectives",
            Resource::SubjectScores => "subject-scores",
            Resource::ObjectiveAchievements => "objective-achievements",
            Resource::ExtracurricularScores => "extracurricular-scores",
            Resource::Attendance => "attendance",
            Resource::GradeStatus => "grade-status",
            Resource::GradeLedger => "grade-ledger",
            Resource::ReportCards => "report-cards",
            Resource::HomeroomNotes => "homeroom-notes",
            Resource::SchoolSettings => "manage-school-settings",
            Resource::AcademicYears => "manage-academic-years",
        }
    }

    /// The dashboard path that shows this resource.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Students => "/data-siswa",
            Resource::Teachers => "/data-guru",
            Resource::Classes => "/data-kelas",
            Resource::Subjects => "/mata-pelajaran",
            Resource::Extracurriculars => "/ekstrakurikuler",
            Resource::LearningObjectives => "/tujuan-pembelajaran",
            Resource::SubjectScores => "/input-nilai-mapel",
            Resource::ObjectiveAchievements => "/capaian-tp",
            Resource::ExtracurricularScores => "/nilai-ekstrakurikuler",
            Resource::Attendance => "/data-ketidakhadiran",
            Resource::GradeStatus => "/status-nilai",
            Resource::GradeLedger => "/leger-nilai",
            Resource::ReportCards => "/cetak-rapor",
            Resource::HomeroomNotes => "/catatan-wali-kelas",
            Resource::SchoolSettings => "/profil-sekolah",
            Resource::AcademicYears => "/tahun-ajaran",
        }
    }

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            Resource::Students => "Data Siswa",
            Resource::Teachers => "Data Guru",
            Resource::Classes => "Data Kelas",
            Resource::Subjects => "Mata Pelajaran",
            Resource::Extracurriculars => "Ekstrakurikuler",
            Resource::LearningObjectives => "Tujuan Pembelajaran",
            Resource::SubjectScores => "Input Nilai Mata Pelajaran",
            Resource::ObjectiveAchievements => "Capaian Tujuan Pembelajaran",
            Resource::ExtracurricularScores => "Nilai Ekstrakurikuler",
            Resource::Attendance => "Data Ketidakhadiran",
            Resource::GradeStatus => "Status Nilai",
            Resource::GradeLedger => "Leger Nilai",
            Resource::ReportCards => "Cetak Rapor",
            Resource::HomeroomNotes => "Catatan Wali Kelas",
            Resource::SchoolSettings => "Profil Sekolah",
            Resource::AcademicYears => "Tahun Ajaran",
        }
    }

    /// The resource shown at `path`, if any.
    pub fn from_path(path: &str) -> Option<Resource> {
        Resource::ALL.into_iter().find(|resource| resource.path() == path)
    }

    fn group(self) -> ResourceGroup {
        match self {
            Resource::Students
            | Resource::SubjectScores
            | Resource::ObjectiveAchievements
            | Resource::ExtracurricularScores
            | Resource::Attendance
            | Resource::GradeStatus
            | Resource::GradeLedger
            | Resource::ReportCards
            | Resource::HomeroomNotes => ResourceGroup::StudentScoped,
            Resource::Teachers => ResourceGroup::TeacherData,
            Resource::Classes
            | Resource::Subjects
            | Resource::SchoolSettings
            | Resource::AcademicYears => ResourceGroup::Administration,
            Resource::Extracurriculars | Resource::LearningObjectives => {
                ResourceGroup::SharedCatalog
            }
        }
    }
}

impl From<Resource> for &'static str {
    fn from(resource: Resource) -> Self {
        resource.tag()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Returned when a tag names no resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource tag: {0}")]
pub struct UnknownResource(pub String);

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|resource| resource.tag() == tag)
            .ok_or_else(|| UnknownResource(tag.to_string()))
    }
}

/// What a role may do with a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    None,
    Read,
    /// Read and write, limited to the class the user is homeroom teacher of.
    OwnClass,
    ReadWrite,
}

impl Permission {
    pub fn allows_read(self) -> bool {
        self != Permission::None
    }

    pub fn allows_write(self) -> bool {
        matches!(self, Permission::OwnClass | Permission::ReadWrite)
    }
}

/// The permission `role` holds on `resource`.
pub fn permission(role: &Role, resource: Resource) -> Permission {
    use ResourceGroup::*;

    match (role, resource.group()) {
        (Role::Admin, _) => Permission::ReadWrite,
        (Role::WaliKelas, StudentScoped) => Permission::OwnClass,
        (Role::Guru | Role::GuruKelas, StudentScoped) => Permission::Read,
        (Role::WaliKelas | Role::Guru | Role::GuruKelas, SharedCatalog) => Permission::Read,
        (Role::WaliKelas | Role::Guru | Role::GuruKelas, TeacherData | Administration) => {
            Permission::None
        }
        (Role::Unrecognized(_), _) => Permission::None,
    }
}

/// Whether `role` may open `resource` at all.
pub fn can_access(role: &Role, resource: Resource) -> bool {
    permission(role, resource).allows_read()
}

/// [`can_access`] for raw role strings and tags; unknown tags are denied.
pub fn can_access_tag(role: &str, tag: &str) -> bool {
    tag.parse::<Resource>()
        .map(|resource| can_access(&Role::from(role), resource))
        .unwrap_or(false)
}

/// Human-readable role name; unknown roles are shown verbatim.
pub fn label_for(role: &Role) -> &str {
    match role {
        Role::Admin => "Administrator",
        Role::Guru => "Guru",
        Role::WaliKelas => "Wali Kelas",
        Role::GuruKelas => "Guru Kelas",
        Role::Unrecognized(raw) => raw,
    }
}

/// Path of the dashboard home.
pub const HOME_PATH: &str = "/";

/// Outcome of a navigation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
    Redirect(&'static str),
}

/// Decides whether `role` may navigate to `path`.
///
/// Home is always reachable; the role router decides what it shows there.
/// Unknown paths and forbidden pages bounce back home, except for
/// unrecognized roles, which are denied outright.
pub fn decide(role: &Role, path: &str) -> Decision {
    let path = normalize_path(path);
    if path == HOME_PATH {
        return Decision::Allow;
    }

    let Some(resource) = Resource::from_path(path) else {
        return Decision::Redirect(HOME_PATH);
    };

    if can_access(role, resource) {
        Decision::Allow
    } else if role.is_recognized() {
        Decision::Redirect(HOME_PATH)
    } else {
        Decision::Deny
    }
}

fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() { HOME_PATH } else { trimmed }
}

/// A clickable menu entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub id: &'static str,
    pub label: &'static str,
    pub path: &'static str,
    pub resource: Option<Resource>,
    pub permission: Option<Permission>,
}

/// A top-level sidebar entry, either a link or a group of links.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuSection {
    pub id: &'static str,
    pub label: &'static str,
    pub path: Option<&'static str>,
    pub items: Vec<MenuItem>,
}

const MENU: &[(&str, &str, &[(&str, Resource)])] = &[
    (
        "data-master",
        "Data Master",
        &[
            ("data-siswa", Resource::Students),
            ("data-guru", Resource::Teachers),
            ("data-kelas", Resource::Classes),
            ("mata-pelajaran", Resource::Subjects),
            ("ekstrakurikuler", Resource::Extracurriculars),
        ],
    ),
    (
        "pembelajaran",
        "Pembelajaran",
        &[("tujuan-pembelajaran", Resource::LearningObjectives)],
    ),
    (
        "penilaian",
        "Penilaian",
        &[
            ("input-nilai-mapel", Resource::SubjectScores),
            ("capaian-tp", Resource::ObjectiveAchievements),
            ("nilai-ekstrakurikuler", Resource::ExtracurricularScores),
            ("data-ketidakhadiran", Resource::Attendance),
        ],
    ),
    (
        "cek-penilaian",
        "Cek Penilaian",
        &[
            ("status-nilai", Resource::GradeStatus),
            ("leger-nilai", Resource::GradeLedger),
        ],
    ),
    (
        "rapor",
        "Rapor",
        &[
            ("cetak-rapor", Resource::ReportCards),
            ("catatan-wali-kelas", Resource::HomeroomNotes),
        ],
    ),
    (
        "pengaturan",
        "Pengaturan",
        &[
            ("profil-sekolah", Resource::SchoolSettings),
            ("tahun-ajaran", Resource::AcademicYears),
        ],
    ),
];

/// The sidebar as `role` sees it. Groups without visible entries are dropped.
pub fn menu_for(role: &Role) -> Vec<MenuSection> {
    let dashboard = MenuSection {
        id: "dashboard",
        label: "Dashboard",
        path: Some(HOME_PATH),
        items: Vec::new(),
    };

    let groups = MENU.iter().filter_map(|&(id, label, entries)| {
        let items: Vec<MenuItem> = entries
            .iter()
            .filter(|&&(_, resource)| can_access(role, resource))
            .map(|&(item_id, resource)| MenuItem {
                id: item_id,
                label: resource.label(),
                path: resource.path(),
                resource: Some(resource),
                permission: Some(permission(role, resource)),
            })
            .collect();

        (!items.is_empty()).then_some(MenuSection {
            id,
            label,
            path: None,
            items,
        })
    });

    std::iter::once(dashboard).chain(groups).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_matrix_holds() {
        assert!(!can_access_tag("guru", "manage-teachers"));
        assert!(can_access_tag("admin", "manage-teachers"));
        assert!(!can_access_tag("wali_kelas", "manage-school-settings"));
    }

    #[test]
    fn student_data_permissions_by_role() {
        assert_eq!(permission(&Role::Admin, Resource::Students), Permission::ReadWrite);
        assert_eq!(permission(&Role::WaliKelas, Resource::Students), Permission::OwnClass);
        assert_eq!(permission(&Role::Guru, Resource::Students), Permission::Read);
        assert_eq!(permission(&Role::GuruKelas, Resource::Students), Permission::Read);
        assert!(!Permission::Read.allows_write());
        assert!(Permission::OwnClass.allows_write());
    }

    #[test]
    fn only_admin_reaches_administration() {
        for resource in [
            Resource::Teachers,
            Resource::Classes,
            Resource::Subjects,
            Resource::SchoolSettings,
            Resource::AcademicYears,
        ] {
            assert!(can_access(&Role::Admin, resource));
            for role in [Role::Guru, Role::GuruKelas, Role::WaliKelas] {
                assert!(!can_access(&role, resource), "{role} must not reach {resource}");
            }
        }
    }

    #[test]
    fn unrecognized_role_is_denied_everything() {
        let role = Role::from("operator");
        assert!(Resource::ALL.into_iter().all(|resource| !can_access(&role, resource)));
        assert_eq!(decide(&role, "/data-siswa"), Decision::Deny);
        assert_eq!(decide(&role, "/"), Decision::Allow);
    }

    #[test]
    fn unknown_tag_is_denied() {
        assert!(!can_access_tag("admin", "launch-missiles"));
        assert!("manage-classes".parse::<Resource>().is_ok());
    }

    #[test]
    fn forbidden_or_unknown_pages_redirect_home() {
        assert_eq!(decide(&Role::Guru, "/data-guru"), Decision::Redirect("/"));
        assert_eq!(decide(&Role::Admin, "/data-guru/"), Decision::Allow);
        assert_eq!(decide(&Role::Guru, "/data-siswa"), Decision::Allow);
        assert_eq!(decide(&Role::Admin, "/nowhere"), Decision::Redirect("/"));
        assert_eq!(decide(&Role::WaliKelas, ""), Decision::Allow);
    }

    #[test]
    fn menu_hides_admin_sections_from_teachers() {
        let menu = menu_for(&Role::Guru);
        let ids: Vec<&str> = menu.iter().map(|section| section.id).collect();
        assert_eq!(
            ids,
            vec!["dashboard", "data-master", "pembelajaran", "penilaian", "cek-penilaian", "rapor"]
        );

        let data_master = &menu[1];
        let items: Vec<&str> = data_master.items.iter().map(|item| item.id).collect();
        assert_eq!(items, vec!["data-siswa", "ekstrakurikuler"]);
    }

    #[test]
    fn admin_menu_is_complete() {
        let menu = menu_for(&Role::Admin);
        assert_eq!(menu.len(), 7);
        let items: usize = menu.iter().map(|section| section.items.len()).sum();
        assert_eq!(items, Resource::ALL.len());
    }

    #[test]
    fn unrecognized_role_sees_only_dashboard() {
        let menu = menu_for(&Role::from(""));
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].path, Some("/"));
    }

    #[test]
    fn labels() {
        assert_eq!(label_for(&Role::Admin), "Administrator");
        assert_eq!(label_for(&Role::GuruKelas), "Guru Kelas");
        assert_eq!(label_for(&Role::from("tata_usaha")), "tata_usaha");
    }
}
