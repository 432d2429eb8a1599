use crate::cli::Context;
use crate::core::approval::ApprovalDesk;
use crate::errors::AppResult;
use crate::models::RequestId;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;

pub fn handle(ctx: &Context, approve: Option<RequestId>, reject: Option<RequestId>) -> AppResult<()> {
    let ledger = ctx.ledger()?;
    let desk = ApprovalDesk::new(&ledger);

    if let Some(id) = approve {
        desk.approve(id)?;
        success(format!("Request #{id} approved."));
        return Ok(());
    }

    if let Some(id) = reject {
        desk.reject(id)?;
        success(format!("Request #{id} rejected."));
        return Ok(());
    }

    let pending = desk.pending()?;
    if pending.is_empty() {
        info("No pending requests.");
        return Ok(());
    }

    let mut table = Table::new(["ID", "Student", "Date", "Reason", "Notes"]);
    for r in pending {
        table.add_row(vec![
            r.id.to_string(),
            r.student_name,
            r.date.to_string(),
            r.reason.label().to_string(),
            r.notes,
        ]);
    }
    print!("{}", table.render());
    Ok(())
}
