//! Envelopes must survive the wire unchanged, including the distinction
//! between absent and empty result records.

use std::io::Cursor;

use rstest::rstest;
use serde_json::json;

use lair_protocol::{
    Argument, CommandRef, CredentialHash, RecordDraft, Request, Response, read_envelope,
    write_envelope,
};

fn through_the_wire<T>(message: &T) -> T
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    let mut buffer = Vec::new();
    write_envelope(&mut buffer, message).expect("write envelope");
    read_envelope(&mut Cursor::new(buffer))
        .expect("read envelope")
        .expect("envelope present")
}

#[rstest]
#[case::absent(Response::message("Record 3 updated"))]
#[case::empty(Response::records(Vec::new()))]
#[case::populated(Response::records(vec![String::from("1 Smaug"), String::from("2 Glaurung")]))]
#[case::exit(Response::exit())]
#[case::connected(Response::connected("Welcome, alice"))]
fn responses_survive_the_wire(#[case] response: Response) {
    assert_eq!(through_the_wire(&response), response);
}

#[test]
fn empty_records_do_not_collapse_into_absent() {
    let decoded = through_the_wire(&Response::records(Vec::new()));
    assert_eq!(decoded.result_records, Some(Vec::new()));
}

#[test]
fn command_requests_keep_typed_arguments_and_state() {
    let command = CommandRef::new(
        "update",
        vec![
            Argument::Integer(3),
            Argument::Record(RecordDraft {
                name: String::from("Ancalagon"),
                age: 900,
                description: Some(String::from("the black")),
                killer: Some(String::from("Eärendil")),
            }),
            Argument::Text(String::from("note")),
        ],
    )
    .with_client_state(json!({ "attempt": 2 }));
    let request = Request::command("alice", CredentialHash::new(vec![7; 64]), command);
    assert_eq!(through_the_wire(&request), request);
}

#[test]
fn auth_requests_keep_registration_intent() {
    let request = Request::auth("bob", CredentialHash::new(vec![1, 2, 3]), true);
    let decoded = through_the_wire(&request);
    assert_eq!(decoded, request);
    assert!(decoded.command_ref().is_none());
}
