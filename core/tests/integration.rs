//! End-to-end scenarios against the live mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port so state never leaks
//! between scenarios, then drives the core client over real HTTP with a ureq
//! transport. Requests are built and responses parsed by the core; the
//! transport only moves bytes.

use std::time::Duration;

use bcc_core::types::{
    AspVolumesArgs, CreateAspArgs, CreateCdsVolumeArgs, CreateDeploySetArgs, CreateImageArgs,
    CreateInstanceArgs, CreateSecurityGroupArgs, CreateSnapshotArgs, DeploySetStrategy, Direction,
    ImageSource, ImageType, InstanceStatus, ListAspArgs, ListCdsVolumeArgs, ListImageArgs, ListInstanceArgs,
    ListSecurityGroupArgs, ListSnapshotArgs, ModifyInstanceAttributeArgs, ResizeCdsVolumeArgs,
    ResizeInstanceArgs, SecurityGroupRuleArgs, SecurityGroupRuleModel, SharedUser, VolumeStatus,
};
use bcc_core::{ApiError, BccClient, Billing, ClientToken, HttpMethod, HttpRequest, HttpResponse, WaitPolicy};
use bcc_mock_server::{REQUEST_ID_HEADER, SYSTEM_IMAGE_ID};

/// Execute an `HttpRequest` with ureq.
///
/// 4xx/5xx answers come back as data, not `Err`, so the core decides what a
/// status means.
fn execute(agent: &ureq::Agent, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
    let url = req.url();
    let result = match (req.method, req.body.as_deref()) {
        (HttpMethod::Get, _) => agent.get(&url).call(),
        (HttpMethod::Delete, _) => agent.delete(&url).call(),
        (HttpMethod::Post, Some(body)) => agent.post(&url).content_type("application/json").send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&url).send_empty(),
        (HttpMethod::Put, Some(body)) => agent.put(&url).content_type("application/json").send(body.as_bytes()),
        (HttpMethod::Put, None) => agent.put(&url).send_empty(),
    };
    let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    Ok(HttpResponse { status, headers, body })
}

fn agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// Start a fresh mock server and return a client bound to it.
fn start() -> BccClient {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            bcc_mock_server::run(listener).await
        })
        .unwrap();
    });

    BccClient::with_credentials("ak", "sk", &format!("http://{addr}")).unwrap()
}

fn fast() -> WaitPolicy {
    WaitPolicy::new(Duration::from_millis(10), Duration::from_secs(5))
}

fn instance_args() -> CreateInstanceArgs {
    CreateInstanceArgs::new(SYSTEM_IMAGE_ID, Billing::postpaid(), 1, 4)
}

#[test]
fn instance_lifecycle() {
    let client = start();
    let agent = agent();
    let transport = |req: &HttpRequest| execute(&agent, req);

    // Create and wait for Running.
    let created = client
        .create_instance_and_wait(&transport, &instance_args(), &fast())
        .unwrap();
    assert_eq!(created.instance_ids.len(), 1);
    let id = created.instance_ids[0].clone();

    let req = client.build_get_instance_detail(&id).unwrap();
    let detail = client.parse_get_instance_detail(client.send(&transport, &req).unwrap()).unwrap();
    assert_eq!(detail.instance.status, InstanceStatus::Running);
    assert_eq!(detail.instance.memory_capacity_in_gb, 4);

    // Stop, then wait for it.
    let req = client.build_stop_instance(&id, false).unwrap();
    client.parse_empty(client.send(&transport, &req).unwrap()).unwrap();
    let status = client
        .wait_for_instance(&transport, &id, &[InstanceStatus::Stopped], &fast())
        .unwrap();
    assert_eq!(status, InstanceStatus::Stopped);

    // Resize and rename.
    let req = client.build_resize_instance(&id, &ResizeInstanceArgs::new(2, 8)).unwrap();
    client.parse_empty(client.send(&transport, &req).unwrap()).unwrap();
    let rename = ModifyInstanceAttributeArgs {
        name: "web-1".to_string(),
    };
    let req = client.build_modify_instance_attribute(&id, &rename).unwrap();
    client.parse_empty(client.send(&transport, &req).unwrap()).unwrap();

    let req = client.build_get_instance_detail(&id).unwrap();
    let detail = client.parse_get_instance_detail(client.send(&transport, &req).unwrap()).unwrap();
    assert_eq!(detail.instance.name, "web-1");
    assert_eq!((detail.instance.cpu_count, detail.instance.memory_capacity_in_gb), (2, 8));

    // Start again, then delete.
    let req = client.build_start_instance(&id).unwrap();
    client.parse_empty(client.send(&transport, &req).unwrap()).unwrap();
    let req = client.build_delete_instance(&id).unwrap();
    client.parse_empty(client.send(&transport, &req).unwrap()).unwrap();

    // Gone: the provider answers 404 and the waiter gives up immediately.
    let err = client
        .wait_for_instance(&transport, &id, &[InstanceStatus::Running], &fast())
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[test]
fn provider_errors_keep_code_and_request_id() {
    let client = start();
    let agent = agent();

    let req = client.build_get_instance_detail("i-missing").unwrap();
    let response = execute(&agent, &req).unwrap();
    let header = response.header(REQUEST_ID_HEADER).unwrap().to_string();

    let err = client.parse_get_instance_detail(response).unwrap_err();
    match &err {
        ApiError::Provider { status, code, .. } => {
            assert_eq!(*status, 404);
            assert_eq!(code.as_deref(), Some("NoSuchObject"));
        }
        other => panic!("expected a provider error, got {other:?}"),
    }
    assert_eq!(err.request_id(), Some(header.as_str()));
}

#[test]
fn client_side_validation_sends_nothing() {
    let client = start();
    let args = CreateInstanceArgs::new(SYSTEM_IMAGE_ID, Billing::postpaid(), 0, 4);
    assert!(matches!(
        client.build_create_instance(&args),
        Err(ApiError::InvalidArgument(_))
    ));
    assert!(matches!(
        client.build_get_instance_detail(""),
        Err(ApiError::InvalidArgument(_))
    ));
}

#[test]
fn listing_follows_markers_to_the_last_page() {
    let client = start();
    let agent = agent();
    let transport = |req: &HttpRequest| execute(&agent, req);

    let mut args = instance_args();
    args.purchase_count = Some(5);
    let req = client.build_create_instance(&args).unwrap();
    let created = client.parse_create_instance(client.send(&transport, &req).unwrap()).unwrap();
    assert_eq!(created.instance_ids.len(), 5);

    let mut query = ListInstanceArgs {
        max_keys: Some(2),
        ..Default::default()
    };
    let mut seen = Vec::new();
    let mut pages = 0;
    loop {
        let req = client.build_list_instances(&query);
        let page = client.parse_list_instances(client.send(&transport, &req).unwrap()).unwrap();
        pages += 1;
        seen.extend(page.items.iter().map(|i| i.instance_id.clone()));
        match page.next_marker() {
            Some(marker) => query.marker = Some(marker.to_string()),
            None => break,
        }
    }
    assert_eq!(pages, 3);
    let mut expected = created.instance_ids.clone();
    expected.sort();
    assert_eq!(seen, expected);
}

#[test]
fn client_token_makes_create_idempotent() {
    let client = start();
    let agent = agent();
    let transport = |req: &HttpRequest| execute(&agent, req);

    let mut args = instance_args();
    args.client_token = Some(ClientToken::new("retry-safe-1"));
    let req = client.build_create_instance(&args).unwrap();
    let first = client.parse_create_instance(client.send(&transport, &req).unwrap()).unwrap();
    let second = client.parse_create_instance(client.send(&transport, &req).unwrap()).unwrap();
    assert_eq!(first, second);

    let req = client.build_list_instances(&ListInstanceArgs::default());
    let page = client.parse_list_instances(client.send(&transport, &req).unwrap()).unwrap();
    assert_eq!(page.items.len(), 1);
    assert!(page.is_last());
}

#[test]
fn volume_workflows() {
    let client = start();
    let agent = agent();
    let transport = |req: &HttpRequest| execute(&agent, req);

    let instance = client
        .create_instance_and_wait(&transport, &instance_args(), &fast())
        .unwrap()
        .instance_ids
        .remove(0);

    let volume_args = CreateCdsVolumeArgs {
        cds_size_in_gb: Some(40),
        billing: Some(Billing::postpaid()),
        ..Default::default()
    };
    let volume = client
        .create_volume_and_wait(&transport, &volume_args, &fast())
        .unwrap()
        .volume_ids
        .remove(0);

    let attached = client
        .attach_volume_and_wait(&transport, &volume, &instance, &fast())
        .unwrap();
    assert_eq!(attached.volume_attachment.instance_id, instance);

    let query = ListCdsVolumeArgs {
        instance_id: Some(instance.clone()),
        ..Default::default()
    };
    let req = client.build_list_cds_volume(&query);
    let page = client.parse_list_cds_volume(client.send(&transport, &req).unwrap()).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].status, VolumeStatus::InUse);

    // An attached volume settles back to InUse after growing.
    let status = client
        .resize_volume_and_wait(&transport, &volume, &ResizeCdsVolumeArgs::new(80), &fast())
        .unwrap();
    assert_eq!(status, VolumeStatus::InUse);

    // Shrinking is refused by the provider.
    let req = client.build_resize_cds_volume(&volume, &ResizeCdsVolumeArgs::new(20)).unwrap();
    let err = client.parse_empty(client.send(&transport, &req).unwrap()).unwrap_err();
    assert!(err.is_client_error());

    // Deleting an attached volume conflicts.
    let req = client.build_delete_cds_volume(&volume).unwrap();
    let err = client.parse_empty(client.send(&transport, &req).unwrap()).unwrap_err();
    assert!(matches!(err, ApiError::Provider { status: 409, .. }));

    client
        .detach_volume_and_wait(&transport, &volume, &instance, &fast())
        .unwrap();
    let req = client.build_get_cds_volume_detail(&volume).unwrap();
    let detail = client.parse_get_cds_volume_detail(client.send(&transport, &req).unwrap()).unwrap();
    assert_eq!(detail.volume.disk_size_in_gb, 80);
    assert!(detail.volume.attachments.is_empty());

    let req = client.build_delete_cds_volume(&volume).unwrap();
    client.parse_empty(client.send(&transport, &req).unwrap()).unwrap();
}

#[test]
fn waiting_past_the_deadline_times_out() {
    let client = start();
    let agent = agent();
    let transport = |req: &HttpRequest| execute(&agent, req);

    let id = client
        .create_instance_and_wait(&transport, &instance_args(), &fast())
        .unwrap()
        .instance_ids
        .remove(0);

    let short = WaitPolicy::new(Duration::from_millis(10), Duration::from_millis(50));
    let err = client
        .wait_for_instance(&transport, &id, &[InstanceStatus::Stopped], &short)
        .unwrap_err();
    match err {
        ApiError::Timeout {
            resource,
            id: timed_out,
            last_status,
            waited,
        } => {
            assert_eq!(resource, "instance");
            assert_eq!(timed_out, id);
            assert_eq!(last_status.as_deref(), Some("Running"));
            assert!(waited >= Duration::from_millis(50));
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
}

#[test]
fn security_groups_snapshots_and_images() {
    let client = start();
    let agent = agent();
    let transport = |req: &HttpRequest| execute(&agent, req);

    // Security group with one rule, then a second one authorized later.
    let mut ssh = SecurityGroupRuleModel::new(Direction::Ingress);
    ssh.protocol = Some("tcp".to_string());
    ssh.port_range = Some("22".to_string());
    let req = client
        .build_create_security_group(&CreateSecurityGroupArgs::new("ops", vec![ssh]))
        .unwrap();
    let group = client
        .parse_create_security_group(client.send(&transport, &req).unwrap())
        .unwrap()
        .security_group_id;

    let egress = SecurityGroupRuleArgs {
        rule: SecurityGroupRuleModel::new(Direction::Egress),
    };
    let req = client.build_authorize_security_group_rule(&group, &egress).unwrap();
    client.parse_empty(client.send(&transport, &req).unwrap()).unwrap();

    let req = client.build_list_security_group(&ListSecurityGroupArgs::default());
    let groups = client.parse_list_security_group(client.send(&transport, &req).unwrap()).unwrap();
    assert_eq!(groups.items.len(), 1);
    assert_eq!(groups.items[0].rules.len(), 2);

    // Instance in that group; the group cannot go while it is bound.
    let mut args = instance_args();
    args.security_group_id = Some(group.clone());
    let instance = client
        .create_instance_and_wait(&transport, &args, &fast())
        .unwrap()
        .instance_ids
        .remove(0);
    let req = client.build_delete_security_group(&group).unwrap();
    let err = client.parse_empty(client.send(&transport, &req).unwrap()).unwrap_err();
    assert_eq!(err.code(), Some("SecurityGroup.InUse"));

    // Snapshot a volume, then build a custom image from the instance.
    let volume_args = CreateCdsVolumeArgs {
        cds_size_in_gb: Some(10),
        ..Default::default()
    };
    let volume = client
        .create_volume_and_wait(&transport, &volume_args, &fast())
        .unwrap()
        .volume_ids
        .remove(0);
    let req = client.build_create_snapshot(&CreateSnapshotArgs::new(&volume, "before-upgrade")).unwrap();
    let snapshot = client.parse_create_snapshot(client.send(&transport, &req).unwrap()).unwrap().snapshot_id;

    let query = ListSnapshotArgs {
        volume_id: Some(volume.clone()),
        ..Default::default()
    };
    let req = client.build_list_snapshot(&query);
    let snapshots = client.parse_list_snapshot(client.send(&transport, &req).unwrap()).unwrap();
    assert_eq!(snapshots.items[0].id, snapshot);
    assert_eq!(snapshots.items[0].size_in_gb, 10);

    let image_args = CreateImageArgs {
        image_name: "golden".to_string(),
        source: ImageSource::Instance(instance.clone()),
        client_token: None,
    };
    let req = client.build_create_image(&image_args).unwrap();
    let image = client.parse_create_image(client.send(&transport, &req).unwrap()).unwrap().image_id;

    let query = ListImageArgs {
        image_type: Some(ImageType::Custom),
        ..Default::default()
    };
    let req = client.build_list_image(&query);
    let images = client.parse_list_image(client.send(&transport, &req).unwrap()).unwrap();
    assert_eq!(images.items.len(), 1);
    assert_eq!(images.items[0].id, image);
    assert_eq!(images.items[0].os_name.as_deref(), Some("Ubuntu"));

    let req = client.build_share_image(&image, &SharedUser::by_id("acct-42")).unwrap();
    client.parse_empty(client.send(&transport, &req).unwrap()).unwrap();
    let req = client.build_get_image_shared_user(&image).unwrap();
    let shared = client.parse_get_image_shared_user(client.send(&transport, &req).unwrap()).unwrap();
    assert_eq!(shared.users[0].account_id.as_deref(), Some("acct-42"));
}

#[test]
fn auto_snapshot_policies_and_deploy_sets() {
    let client = start();
    let agent = agent();
    let transport = |req: &HttpRequest| execute(&agent, req);

    let volume = client
        .create_volume_and_wait(
            &transport,
            &CreateCdsVolumeArgs {
                cds_size_in_gb: Some(10),
                ..Default::default()
            },
            &fast(),
        )
        .unwrap()
        .volume_ids
        .remove(0);

    let policy = CreateAspArgs {
        name: "nightly".to_string(),
        time_points: vec!["2".to_string()],
        repeat_weekdays: vec!["0".to_string(), "3".to_string()],
        retention_days: "7".to_string(),
        client_token: None,
    };
    let req = client.build_create_auto_snapshot_policy(&policy).unwrap();
    let asp = client
        .parse_create_auto_snapshot_policy(client.send(&transport, &req).unwrap())
        .unwrap()
        .asp_id;

    let attach = AspVolumesArgs {
        volume_ids: vec![volume.clone()],
    };
    let req = client.build_attach_auto_snapshot_policy(&asp, &attach).unwrap();
    client.parse_empty(client.send(&transport, &req).unwrap()).unwrap();

    let req = client.build_get_auto_snapshot_policy(&asp).unwrap();
    let fetched = client
        .parse_get_auto_snapshot_policy(client.send(&transport, &req).unwrap())
        .unwrap()
        .auto_snapshot_policy;
    assert_eq!(fetched.retention_days, Some(7));
    assert_eq!(fetched.volume_count, 1);

    let query = ListAspArgs {
        asp_name: Some("nightly".to_string()),
        ..Default::default()
    };
    let req = client.build_list_auto_snapshot_policy(&query);
    let page = client
        .parse_list_auto_snapshot_policy(client.send(&transport, &req).unwrap())
        .unwrap();
    assert_eq!(page.items.len(), 1);

    let deploy_args = CreateDeploySetArgs {
        strategy: DeploySetStrategy::HostHa,
        name: Some("spread".to_string()),
        description: None,
        client_token: None,
    };
    let req = client.build_create_deploy_set(&deploy_args).unwrap();
    let deploy_set = client
        .parse_create_deploy_set(client.send(&transport, &req).unwrap())
        .unwrap()
        .deploy_set_ids
        .remove(0);
    let req = client.build_list_deploy_sets();
    let listed = client.parse_list_deploy_sets(client.send(&transport, &req).unwrap()).unwrap();
    assert_eq!(listed.deploy_sets[0].deploy_set_id, deploy_set);
    assert_eq!(listed.deploy_sets[0].strategy.as_deref(), Some("HOST_HA"));

    let req = client.build_delete_deploy_set(&deploy_set).unwrap();
    client.parse_empty(client.send(&transport, &req).unwrap()).unwrap();
}
