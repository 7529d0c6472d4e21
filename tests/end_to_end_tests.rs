//! Client session against the reference server over real HTTP.


use conteo_assign::assignment::{AssignmentSession, Direction, SessionOptions, Severity};
use conteo_assign::config::ClientConfig;
use conteo_assign::error::ConteoError;
use conteo_assign::gateway::{Gateway, HttpGateway};
use conteo_assign::model::{
    BulkAssignmentRequest, CompanyId, GroupId, LocationId, WarehouseId, WorkerId,
};
use test_harness::{fixture_inventory, ids, location_ids, TestServer};

const TOKEN: &str = "secreto";

fn gateway_for(server: &TestServer, token: &str) -> HttpGateway {
    let config = ClientConfig::new(server.base_url.clone())
        .with_token(token)
        .with_company(CompanyId(1));
    HttpGateway::new(&config).unwrap()
}

async fn open_session(gateway: &HttpGateway, worker: u64) -> AssignmentSession {
    let mut session = AssignmentSession::start(gateway, SessionOptions::default()).await;
    session.select_worker(Some(WorkerId(worker)));
    session.select_group(Some(GroupId(3)));
    session.select_warehouse(Some(WarehouseId(2)));
    session.refresh(gateway).await;
    session
}

#[tokio::test]
async fn test_assign_save_and_reload() {
    let server = TestServer::start(fixture_inventory(), Some(TOKEN)).await;
    let gateway = gateway_for(&server, TOKEN);

    let mut session = open_session(&gateway, 7).await;
    assert_eq!(session.reference().workers.len(), 2);
    assert_eq!(location_ids(session.available()), ids(&[101, 102, 103]));
    assert!(session.assigned().is_empty());

    session
        .transfer(&ids(&[101, 102]), Direction::ToAssigned)
        .unwrap();
    session.save(&gateway).await.unwrap();
    let notices = session.take_notices();
    assert_eq!(notices[0].severity, Severity::Success);

    // A fresh session sees what the server persisted
    let reloaded = open_session(&gateway, 7).await;
    assert_eq!(location_ids(reloaded.assigned()), ids(&[101, 102]));
    assert_eq!(location_ids(reloaded.available()), ids(&[103]));
    assert_eq!(reloaded.summary().len(), 1);
    assert_eq!(reloaded.summary()[0].warehouse_name, "Principal");
    assert_eq!(reloaded.summary()[0].total_locations, 2);

    let stored = server.inventory().await;
    let set = stored.assignment_set(WorkerId(7), GroupId(3), WarehouseId(2));
    assert_eq!(set.into_iter().collect::<Vec<_>>(), ids(&[101, 102]));
}

#[tokio::test]
async fn test_repeated_save_is_idempotent() {
    let server = TestServer::start(fixture_inventory(), Some(TOKEN)).await;
    let gateway = gateway_for(&server, TOKEN);

    let mut session = open_session(&gateway, 7).await;
    session
        .transfer(&ids(&[103]), Direction::ToAssigned)
        .unwrap();

    session.save(&gateway).await.unwrap();
    let after_first = server.inventory().await.assignments;
    session.save(&gateway).await.unwrap();
    let after_second = server.inventory().await.assignments;

    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn test_moving_back_removes_assignment() {
    let server =
        TestServer::start(fixture_inventory().with_assignment(7, 3, 102), Some(TOKEN)).await;
    let gateway = gateway_for(&server, TOKEN);

    let mut session = open_session(&gateway, 7).await;
    assert_eq!(location_ids(session.assigned()), ids(&[102]));

    session
        .transfer(&ids(&[102]), Direction::ToAvailable)
        .unwrap();
    session.save(&gateway).await.unwrap();

    let stored = server.inventory().await;
    assert!(stored
        .assignment_set(WorkerId(7), GroupId(3), WarehouseId(2))
        .is_empty());
    // Worker 8's assignment elsewhere is untouched
    assert_eq!(stored.assignments.len(), 1);
}

#[tokio::test]
async fn test_wrong_token_expires_session() {
    let server = TestServer::start(fixture_inventory(), Some(TOKEN)).await;
    let gateway = gateway_for(&server, "caducado");

    let err = gateway.list_warehouses().await.unwrap_err();
    assert!(matches!(err, ConteoError::Unauthorized));
    assert!(gateway.is_expired());

    // Further calls fail without reaching the server
    let err = gateway.list_users().await.unwrap_err();
    assert!(matches!(err, ConteoError::Unauthorized));

    gateway.set_token(TOKEN);
    assert!(!gateway.is_expired());
    let warehouses = gateway.list_warehouses().await.unwrap();
    assert_eq!(warehouses.len(), 2);
}

#[tokio::test]
async fn test_unauthorized_reference_load_leaves_lists_empty() {
    let server = TestServer::start(fixture_inventory(), Some(TOKEN)).await;
    let gateway = gateway_for(&server, "caducado");

    let session = AssignmentSession::start(&gateway, SessionOptions::default()).await;
    assert!(session.reference().workers.is_empty());
    assert!(session.reference().groups.is_empty());
    assert!(session.reference().warehouses.is_empty());
}

#[tokio::test]
async fn test_rejected_save_reports_server_message() {
    let server = TestServer::start(fixture_inventory(), Some(TOKEN)).await;
    let gateway = gateway_for(&server, TOKEN);

    let request = BulkAssignmentRequest {
        worker_id: WorkerId(7),
        group_id: GroupId(3),
        warehouse_id: WarehouseId(2),
        locations: vec![LocationId(101), LocationId(501)],
        company_id: Some(CompanyId(1)),
    };
    let err = gateway.save_assignment(&request).await.unwrap_err();
    match err {
        ConteoError::Status { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("501"), "unexpected body: {body}");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(!gateway.is_expired());
    assert_eq!(server.inventory().await.assignments.len(), 1);
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gateway = HttpGateway::new(&ClientConfig::new(format!("http://{addr}"))).unwrap();
    let err = gateway.list_users().await.unwrap_err();
    assert!(matches!(err, ConteoError::Transport(_)));
    assert!(!gateway.is_expired());
}

#[tokio::test]
async fn test_cross_group_unassign_does_not_persist() {
    // 101 belongs to worker 7 under group 4; the session works on group 3
    let server =
        TestServer::start(fixture_inventory().with_assignment(7, 4, 101), Some(TOKEN)).await;
    let gateway = gateway_for(&server, TOKEN);

    let mut session = open_session(&gateway, 7).await;
    assert_eq!(location_ids(session.assigned()), ids(&[101]));

    session
        .transfer(&ids(&[101]), Direction::ToAvailable)
        .unwrap();
    session.save(&gateway).await.unwrap();

    // Saving group 3 cannot release a group 4 assignment
    let reloaded = open_session(&gateway, 7).await;
    assert_eq!(location_ids(reloaded.assigned()), ids(&[101]));
    let stored = server.inventory().await;
    assert!(stored
        .assignment_set(WorkerId(7), GroupId(4), WarehouseId(2))
        .contains(&LocationId(101)));
}

#[tokio::test]
async fn test_untouched_cross_group_assignment_is_copied_on_save() {
    let server =
        TestServer::start(fixture_inventory().with_assignment(7, 4, 101), Some(TOKEN)).await;
    let gateway = gateway_for(&server, TOKEN);

    let mut session = open_session(&gateway, 7).await;
    session.save(&gateway).await.unwrap();

    let stored = server.inventory().await;
    assert_eq!(
        stored
            .assignment_set(WorkerId(7), GroupId(3), WarehouseId(2))
            .into_iter()
            .collect::<Vec<_>>(),
        ids(&[101])
    );
    assert!(stored
        .assignment_set(WorkerId(7), GroupId(4), WarehouseId(2))
        .contains(&LocationId(101)));
}
