pub mod attendance_status;
pub mod eligibility;
pub mod month_view;
pub mod reason;
pub mod request;
pub mod session;

pub use attendance_status::AttendanceStatus;
pub use eligibility::EligibilitySnapshot;
pub use month_view::{DayEntry, MonthView};
pub use reason::RegularizationReason;
pub use request::{PendingRequest, RegularizationRequest, RequestId, RequestStatus, Resolution};
pub use session::{Session, SessionId, SessionInfo};
