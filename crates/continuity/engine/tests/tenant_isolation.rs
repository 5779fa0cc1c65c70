use chrono::{Duration, Utc};
use continuity_engine::{
    ContinuityCore, ContinuityError, EngineConfig, NewCampaign, NewControl, NewPolicy,
    NewProcess, NewRiskAssessment,
};
use continuity_storage::{InMemoryContinuityStorage, QueryWindow};
use continuity_types::{
    ApplicationCriteria, Automation, ControlAttributes, ControlType, Documentation,
    Effectiveness, ProcessId, TenantId, UserId,
};
use std::sync::Arc;

fn core() -> ContinuityCore {
    ContinuityCore::new(
        Arc::new(InMemoryContinuityStorage::new()),
        EngineConfig::default(),
    )
}

fn assert_not_found<T: std::fmt::Debug>(result: Result<T, ContinuityError>) {
    match result {
        Err(ContinuityError::NotFound { .. }) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn records_are_invisible_across_tenants() {
    let core = core();
    let acme = TenantId::new("acme");
    let globex = TenantId::new("globex");
    let user = UserId::new("u1");

    let campaign = core
        .campaigns()
        .create(
            &acme,
            &user,
            NewCampaign {
                name: "Acme BIA".into(),
                description: None,
                deadline: Utc::now() + Duration::days(7),
                target_processes: vec![],
            },
        )
        .await
        .unwrap();
    let policy = core
        .documents()
        .create(
            &acme,
            NewPolicy {
                title: "Acme BCP".into(),
                content: String::new(),
                version: Some("2.1".into()),
            },
        )
        .await
        .unwrap();
    let risk = core
        .risk()
        .create_assessment(
            &acme,
            NewRiskAssessment {
                title: "Ransomware".into(),
                probability_before: 4,
                impact_before: 5,
            },
        )
        .await
        .unwrap();

    assert_not_found(core.campaigns().get(&globex, &campaign.id).await);
    assert_not_found(core.campaigns().launch(&globex, &campaign.id, &user).await);
    assert_not_found(core.campaigns().update_progress(&globex, &campaign.id).await);
    assert!(core
        .campaigns()
        .list(&globex, QueryWindow::default())
        .await
        .unwrap()
        .is_empty());

    assert_not_found(core.documents().get(&globex, &policy.id).await);
    assert_not_found(core.documents().publish(&globex, &policy.id).await);

    assert_not_found(core.risk().get_assessment(&globex, &risk.id).await);
    assert_not_found(core.risk().calculate_residual_risk(&globex, &risk.id).await);
    assert_not_found(
        core.risk()
            .create_control(
                &globex,
                NewControl {
                    risk_assessment_id: risk.id.clone(),
                    description: "Offline backups".into(),
                    attributes: ControlAttributes {
                        control_type: ControlType::Corrective,
                        application_criteria: ApplicationCriteria::Always,
                        documentation: Documentation::Yes,
                        effectiveness: Effectiveness::Effective,
                        automation: Automation::Automatic,
                    },
                },
            )
            .await,
    );
}

#[tokio::test]
async fn launch_ignores_processes_of_other_tenants() {
    let core = core();
    let acme = TenantId::new("acme");
    let globex = TenantId::new("globex");
    let user = UserId::new("u1");

    core.processes()
        .register_process(
            &globex,
            NewProcess {
                id: Some(ProcessId::new("shared-id")),
                name: "Globex payroll".into(),
                responsible_person: None,
            },
        )
        .await
        .unwrap();

    let campaign = core
        .campaigns()
        .create(
            &acme,
            &user,
            NewCampaign {
                name: "Acme BIA".into(),
                description: None,
                deadline: Utc::now() + Duration::days(7),
                target_processes: vec![ProcessId::new("shared-id")],
            },
        )
        .await
        .unwrap();

    let outcome = core.campaigns().launch(&acme, &campaign.id, &user).await.unwrap();
    assert_eq!(outcome.workflows_created, 0);
}
