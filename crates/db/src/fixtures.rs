use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use procura_core::domain::actor::ActorId;
use procura_core::domain::approval::{Approval, ApprovalId, ApprovalLevel, ApprovalStatus};
use procura_core::domain::purchase_order::{PoApprovalRecord, PoId, PoLine, PurchaseOrder};
use procura_core::domain::request::{PurchaseRequest, RequestId, RequestItem, RequestStatus};

use crate::store::{StoreError, WorkflowStore};

/// Canonical demo seeds and verification contract for the three core
/// workflow scenarios.
const SEED_SCENARIOS: &[SeedScenarioContract] = &[
    SeedScenarioContract {
        scenario: "mid_approval",
        request_id: "req-demo-midapproval-001",
        status: RequestStatus::Pending,
        first_level: ApprovalStatus::Approved,
        second_level: ApprovalStatus::Pending,
        has_po: false,
        description: "Office supplies - first level approved, awaiting second",
    },
    SeedScenarioContract {
        scenario: "approved_awaiting_receipt",
        request_id: "req-demo-approved-001",
        status: RequestStatus::Approved,
        first_level: ApprovalStatus::Approved,
        second_level: ApprovalStatus::Approved,
        has_po: true,
        description: "Printer toner - fully approved with issued PO",
    },
    SeedScenarioContract {
        scenario: "rejected",
        request_id: "req-demo-rejected-001",
        status: RequestStatus::Rejected,
        first_level: ApprovalStatus::Rejected,
        second_level: ApprovalStatus::Pending,
        has_po: false,
        description: "Conference travel - rejected at first level",
    },
];

/// Demo seed dataset for the three core workflow scenarios.
///
/// Provides deterministic fixtures for:
/// 1. A request mid-way through approval
/// 2. A fully approved request with its purchase order
/// 3. A rejected request
pub struct DemoSeedDataset;

impl DemoSeedDataset {
    /// Load the demo dataset through the store contract. Safe to call more
    /// than once; re-runs leave the same state behind.
    pub async fn load(store: &dyn WorkflowStore) -> Result<SeedResult, StoreError> {
        for scenario in SEED_SCENARIOS {
            seed_scenario(store, scenario).await?;
        }

        let requests_seeded = SEED_SCENARIOS
            .iter()
            .map(|scenario| RequestSeedInfo {
                scenario: scenario.scenario,
                request_id: scenario.request_id,
                description: scenario.description,
            })
            .collect::<Vec<_>>();

        Ok(SeedResult { requests_seeded })
    }

    /// Verify that seed data exists and matches the contract.
    pub async fn verify(store: &dyn WorkflowStore) -> Result<SeedVerification, StoreError> {
        let mut checks = Vec::new();

        for scenario in SEED_SCENARIOS {
            let id = RequestId(scenario.request_id.to_string());

            let request = store.find_request(&id).await?;
            let status_ok =
                request.as_ref().map(|request| request.status) == Some(scenario.status);
            checks.push((scenario.request_label(), status_ok));

            let items_ok = request.map(|request| !request.items.is_empty()).unwrap_or(false);
            checks.push((scenario.items_label(), items_ok));

            let approvals = store.list_approvals(&id).await?;
            let ledger_ok = approvals.len() == 2
                && approvals[0].status == scenario.first_level
                && approvals[1].status == scenario.second_level;
            checks.push((scenario.ledger_label(), ledger_ok));

            let po = store.find_po(&id).await?;
            checks.push((scenario.po_label(), po.is_some() == scenario.has_po));
        }

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(SeedVerification { all_present, checks })
    }

    /// Remove seeded fixtures; children go with the request rows.
    pub async fn clean(store: &dyn WorkflowStore) -> Result<(), StoreError> {
        for scenario in SEED_SCENARIOS {
            store.delete_request(&RequestId(scenario.request_id.to_string())).await?;
        }
        Ok(())
    }
}

async fn seed_scenario(
    store: &dyn WorkflowStore,
    scenario: &SeedScenarioContract,
) -> Result<(), StoreError> {
    let seeded_at = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).single().unwrap_or_else(Utc::now);
    let id = RequestId(scenario.request_id.to_string());

    let mut request = PurchaseRequest {
        id: id.clone(),
        title: scenario.description.split(" - ").next().unwrap_or("Demo request").to_string(),
        description: scenario.description.to_string(),
        amount: Decimal::ZERO,
        status: RequestStatus::Pending,
        created_by: ActorId("u-demo-staff".to_string()),
        items: vec![
            RequestItem {
                name: "Paper".to_string(),
                quantity: 10,
                unit_price: Decimal::new(2500, 2),
            },
            RequestItem {
                name: "Pens".to_string(),
                quantity: 20,
                unit_price: Decimal::new(150, 2),
            },
        ],
        proforma_file: None,
        purchase_order_file: None,
        receipt_file: None,
        created_at: seeded_at,
        updated_at: seeded_at,
    };
    request.refresh_amount();
    store.save_request(&request).await?;

    for (level, status) in [
        (ApprovalLevel::First, scenario.first_level),
        (ApprovalLevel::Second, scenario.second_level),
    ] {
        let approver = (status != ApprovalStatus::Pending)
            .then(|| ActorId(format!("u-demo-approver-{}", level.as_i64())));
        let comment = match status {
            ApprovalStatus::Rejected => "over budget for this quarter".to_string(),
            _ => String::new(),
        };
        store
            .upsert_approval(&Approval {
                id: ApprovalId(format!("{}-approval-{}", scenario.request_id, level.as_i64())),
                request_id: id.clone(),
                level,
                approver,
                status,
                comment,
                created_at: seeded_at,
                updated_at: seeded_at,
            })
            .await?;
    }

    match scenario.status {
        RequestStatus::Pending => {}
        // Re-runs find the request already transitioned; the CAS returning
        // false is the expected outcome then.
        RequestStatus::Approved => {
            store.transition_status(&id, RequestStatus::Pending, RequestStatus::Approved).await?;
        }
        RequestStatus::Rejected => {
            store.transition_status(&id, RequestStatus::Pending, RequestStatus::Rejected).await?;
        }
    }

    if scenario.has_po {
        let lines = request
            .items
            .iter()
            .map(|item| PoLine {
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total: item.total(),
            })
            .collect::<Vec<_>>();
        let approvals = ApprovalLevel::ALL
            .iter()
            .map(|level| PoApprovalRecord {
                level: *level,
                approver: Some(ActorId(format!("u-demo-approver-{}", level.as_i64()))),
                decided_at: seeded_at,
            })
            .collect();
        store
            .insert_po_if_absent(&PurchaseOrder {
                id: PoId(format!("{}-po", scenario.request_id)),
                po_number: format!("PO_{}_20260115", scenario.request_id),
                request_id: id,
                title: request.title.clone(),
                lines,
                total: request.amount,
                approvals,
                issued_at: seeded_at,
            })
            .await?;
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct SeedScenarioContract {
    scenario: &'static str,
    request_id: &'static str,
    status: RequestStatus,
    first_level: ApprovalStatus,
    second_level: ApprovalStatus,
    has_po: bool,
    description: &'static str,
}

impl SeedScenarioContract {
    fn request_label(&self) -> &'static str {
        match self.scenario {
            "mid_approval" => "request-midapproval-status",
            "approved_awaiting_receipt" => "request-approved-status",
            _ => "request-rejected-status",
        }
    }

    fn items_label(&self) -> &'static str {
        match self.scenario {
            "mid_approval" => "request-midapproval-items",
            "approved_awaiting_receipt" => "request-approved-items",
            _ => "request-rejected-items",
        }
    }

    fn ledger_label(&self) -> &'static str {
        match self.scenario {
            "mid_approval" => "ledger-midapproval",
            "approved_awaiting_receipt" => "ledger-approved",
            _ => "ledger-rejected",
        }
    }

    fn po_label(&self) -> &'static str {
        match self.scenario {
            "mid_approval" => "po-midapproval-absent",
            "approved_awaiting_receipt" => "po-approved-present",
            _ => "po-rejected-absent",
        }
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub requests_seeded: Vec<RequestSeedInfo>,
}

#[derive(Debug)]
pub struct RequestSeedInfo {
    pub scenario: &'static str,
    pub request_id: &'static str,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct SeedVerification {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
