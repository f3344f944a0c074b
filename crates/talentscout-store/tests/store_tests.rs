use std::fs;

use talentscout_core::{CandidateField, Interview, Language, Phase, Session};
use talentscout_store::{SessionStore, StoreError};
use tempfile::TempDir;

/// A session midway through the technical questions
fn sample_session() -> Session {
    let mut session = Session::new(Language::Japanese);
    session.candidate.set(CandidateField::FullName, "Kenji Sato");
    session
        .candidate
        .set(CandidateField::EmailAddress, "kenji@example.jp");
    session.candidate.set(CandidateField::TechStack, "Go, Kafka");
    session.candidate.set(CandidateField::PhoneNumber, "N/A");

    let mut interview = Interview::new(vec![
        "1. Design an event pipeline".to_string(),
        "2. Debug consumer lag".to_string(),
        "3. Tune GC pauses".to_string(),
    ]);
    interview.record_answer("partition by key");
    interview.awaiting_follow_up = true;

    session.push_user("Kenji Sato, kenji@example.jp, Go, Kafka");
    session.push_assistant("Thanks Kenji! First question:\n\n1. Design an event pipeline");
    session.push_user("partition by key");
    session.phase = Phase::AskingQuestions(interview);
    session
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::with_path(dir.path().join("nested").join("session.json"));

    let session = sample_session();
    store.save(&session).unwrap();
    assert!(store.exists());

    let loaded = store.try_load().unwrap().unwrap();
    assert_eq!(loaded, session);
    assert_eq!(loaded.language, Language::Japanese);
    let interview = loaded.phase.interview().unwrap();
    assert!(interview.awaiting_follow_up);
    assert_eq!(interview.answers[&0].answers, vec!["partition by key"]);
}

#[test]
fn test_save_overwrites_without_temp_leftovers() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::with_path(dir.path().join("session.json"));

    store.save(&Session::new(Language::English)).unwrap();
    let session = sample_session();
    store.save(&session).unwrap();

    assert_eq!(store.try_load().unwrap(), Some(session));
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_persisted_keys() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::with_path(dir.path().join("session.json"));
    store.save(&sample_session()).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["infoCollected"], true);
    assert_eq!(raw["techQuestionsAsked"], true);
    assert_eq!(raw["conversationEnded"], false);
    assert_eq!(raw["currentQuestionIndex"], 0);
    assert_eq!(raw["awaitingFollowUp"], true);
    assert_eq!(raw["selectedLanguage"], "Japanese");
    assert_eq!(raw["candidateInfo"]["Tech Stack"], "Go, Kafka");
    assert_eq!(raw["generatedQuestions"].as_array().unwrap().len(), 3);
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::with_path(dir.path().join("session.json"));

    assert!(store.try_load().unwrap().is_none());
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, "{ not json").unwrap();
    let store = SessionStore::with_path(path);

    assert!(matches!(
        store.try_load(),
        Err(StoreError::Serialization(_))
    ));
}

#[test]
fn test_partial_snapshot_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    fs::write(
        &path,
        r#"{"messages":[{"role":"assistant","content":"hi"}],"selectedLanguage":"Spanish","futureField":[1,2]}"#,
    )
    .unwrap();
    let store = SessionStore::with_path(path);

    let session = store.try_load().unwrap().unwrap();
    assert_eq!(session.messages.len(), 1);
    assert_eq!(session.language, Language::Spanish);
    assert_eq!(session.phase, Phase::CollectingInfo);
    assert!(session.candidate.is_empty());
}

#[test]
fn test_reset_deletes_snapshot() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::with_path(dir.path().join("session.json"));

    store.reset().unwrap();

    store.save(&sample_session()).unwrap();
    store.reset().unwrap();
    assert!(!store.exists());
    assert!(store.try_load().unwrap().is_none());
}
