//! Typed helpers per backend resource. Each file extends `ApiClient` with the calls
//! for one area of the HR system.

pub mod attendance;
pub mod auth;
pub mod catalog;
pub mod departments;
pub mod leave;
pub mod missions;
pub mod payroll;
pub mod users;

pub use attendance::{AttendanceFilter, AttendanceRecord, CheckInRequest};
pub use auth::{LoginRequest, LoginResponse};
pub use catalog::{LeaveType, LeaveTypeForm, PermissionRecord, Policy, PolicyForm, RoleForm, RoleRecord, Title, TitleForm};
pub use departments::{Department, DepartmentForm};
pub use leave::{LeaveBalance, LeaveFilter, LeaveForm, LeaveRequest, LeaveStatus};
pub use missions::{Mission, MissionAssignment, MissionForm};
pub use payroll::{Adjustment, AdjustmentForm, PayrollFilter, PayrollRecord, PayrollRun};
pub use users::{EmployeeForm, UserFilter};
