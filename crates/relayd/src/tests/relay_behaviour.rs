//! Behavioural tests driving a running relay over loopback UDP.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

use super::support::RelayWorld;

const LOOPBACK_BLANK_DENIED: &str = "deny-host:blank:127.0.0.1";

#[fixture]
fn world() -> RefCell<RelayWorld> {
    RefCell::new(RelayWorld::new())
}

fn expect_response(world: &RefCell<RelayWorld>, client: &str, expected: &Value) {
    let received = world.borrow_mut().next_response(client);
    assert_eq!(&received, expected, "unexpected datagram for client {client}");
}

fn register(world: &RefCell<RelayWorld>, client: &str, name: &str) {
    world
        .borrow_mut()
        .send(client, &json!({"command": 1, "nickname": name}));
}

fn join(world: &RefCell<RelayWorld>, client: &str, channel: &str) {
    world
        .borrow_mut()
        .send(client, &json!({"command": 3, "channel_name": channel}));
}

#[given("a running relay")]
fn given_running_relay(world: &RefCell<RelayWorld>) {
    world.borrow_mut().start(&[]);
    assert!(world.borrow().relay_running(), "relay failed to start");
}

#[given("a running relay that denies blank commands from loopback")]
fn given_guarded_relay(world: &RefCell<RelayWorld>) {
    world.borrow_mut().start(&[LOOPBACK_BLANK_DENIED]);
    assert!(world.borrow().relay_running(), "relay failed to start");
}

#[given(r#"client "{client}" is registered as "{name}""#)]
fn given_registered(world: &RefCell<RelayWorld>, client: String, name: String) {
    register(world, &client, &name);
    expect_response(world, &client, &json!({"code": 1}));
}

#[given(r#"client "{client}" has joined channel "{channel}""#)]
fn given_joined(world: &RefCell<RelayWorld>, client: String, channel: String) {
    join(world, &client, &channel);
    expect_response(world, &client, &json!({"code": 1}));
}

#[when(r#"client "{client}" registers the name "{name}""#)]
fn when_registers(world: &RefCell<RelayWorld>, client: String, name: String) {
    register(world, &client, &name);
}

#[when(r#"client "{client}" joins channel "{channel}""#)]
fn when_joins(world: &RefCell<RelayWorld>, client: String, channel: String) {
    join(world, &client, &channel);
}

#[when(r#"client "{client}" leaves channel "{channel}""#)]
fn when_leaves(world: &RefCell<RelayWorld>, client: String, channel: String) {
    world
        .borrow_mut()
        .send(&client, &json!({"command": 4, "channel_name": channel}));
}

#[when(r#"client "{client}" whispers "{message}" to "{receiver}""#)]
fn when_whispers(world: &RefCell<RelayWorld>, client: String, message: String, receiver: String) {
    world.borrow_mut().send(
        &client,
        &json!({"command": 5, "receiver": receiver, "message": message}),
    );
}

#[when(r#"client "{client}" says "{message}" in channel "{channel}""#)]
fn when_says(world: &RefCell<RelayWorld>, client: String, message: String, channel: String) {
    world.borrow_mut().send(
        &client,
        &json!({"command": 6, "channel_name": channel, "message": message}),
    );
}

#[when(r#"client "{client}" sends a blank command"#)]
fn when_blank(world: &RefCell<RelayWorld>, client: String) {
    world.borrow_mut().send(&client, &json!({"command": 0}));
}

#[when(r#"client "{client}" requests the user list"#)]
fn when_user_list(world: &RefCell<RelayWorld>, client: String) {
    world.borrow_mut().send(&client, &json!({"command": 8}));
}

#[when(r#"client "{client}" requests the members of channel "{channel}""#)]
fn when_channel_members(world: &RefCell<RelayWorld>, client: String, channel: String) {
    world
        .borrow_mut()
        .send(&client, &json!({"command": 9, "channel_name": channel}));
}

#[then(r#"client "{client}" receives status {code}"#)]
fn then_status(world: &RefCell<RelayWorld>, client: String, code: u8) {
    expect_response(world, &client, &json!({"code": code}));
}

#[then(r#"client "{client}" receives a channel message from "{sender}" in "{channel}" saying "{message}""#)]
fn then_channel_message(
    world: &RefCell<RelayWorld>,
    client: String,
    sender: String,
    channel: String,
    message: String,
) {
    expect_response(
        world,
        &client,
        &json!({
            "code": 3,
            "channel_name": channel,
            "sender_nickname": sender,
            "message": message,
        }),
    );
}

#[then(r#"client "{client}" receives a private message from "{sender}" saying "{message}""#)]
fn then_private_message(
    world: &RefCell<RelayWorld>,
    client: String,
    sender: String,
    message: String,
) {
    expect_response(
        world,
        &client,
        &json!({"code": 4, "sender_nickname": sender, "message": message}),
    );
}

#[then(r#"client "{client}" receives the user list "{users}""#)]
fn then_user_list(world: &RefCell<RelayWorld>, client: String, users: String) {
    let names: Vec<&str> = users.split(',').map(str::trim).collect();
    expect_response(world, &client, &json!({"users": names}));
}

#[then(r#"client "{client}" receives an empty user list"#)]
fn then_empty_user_list(world: &RefCell<RelayWorld>, client: String) {
    expect_response(world, &client, &json!({"users": []}));
}

#[then(r#"client "{client}" receives nothing"#)]
fn then_nothing(world: &RefCell<RelayWorld>, client: String) {
    let received = world.borrow_mut().try_next_response(&client);
    assert!(
        received.is_none(),
        "client {client} received {received:?}"
    );
}

#[scenario(path = "tests/features/channel_messages.feature")]
fn channel_messages(#[from(world)] world: RefCell<RelayWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/unregistered_clients.feature")]
fn unregistered_clients(#[from(world)] world: RefCell<RelayWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/private_messages.feature")]
fn private_messages(#[from(world)] world: RefCell<RelayWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/policy_denial.feature")]
fn policy_denial(#[from(world)] world: RefCell<RelayWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/channel_lifecycle.feature")]
fn channel_lifecycle(#[from(world)] world: RefCell<RelayWorld>) {
    drop(world);
}
