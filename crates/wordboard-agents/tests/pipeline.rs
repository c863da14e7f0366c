//! Full lifecycle of a task across all three agents against the in-memory
//! blackboard.

use wordboard_agents::consumer::run_consumer_once;
use wordboard_agents::scheduler::run_scheduler_tick;
use wordboard_agents::watcher::run_watcher_tick;
use wordboard_core::memory::MemoryStore;
use wordboard_core::model::{TaskStatus, WorkItemStatus};
use wordboard_core::store::BlackboardStore;
use wordboard_core::subsequence::{tag_letters, DEFAULT_MAX_INPUT_LEN};
use wordboard_core::trie::PrefixDictionary;
use wordboard_core::Error;

#[tokio::test]
async fn task_runs_new_to_completed_and_collects_its_words() {
    let store = MemoryStore::new();
    let dict = PrefixDictionary::from_words(["cab", "xyz"]);
    let task = store.create_task("cab");
    assert_eq!(task.status, TaskStatus::New);

    // Scheduler: NEW -> SCHEDULING -> SCHEDULED, one workitem over the
    // tagged letter set.
    run_scheduler_tick(&store).await.unwrap();
    let scheduled = store.get_task(&task.id).await.unwrap();
    assert_eq!(scheduled.status, TaskStatus::Scheduled);
    assert_eq!(scheduled.scheduled_items_count, Some(1));
    let items = store.list_workitems_for_task(&task.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].current_sequence, "");
    assert_eq!(items[0].remaining_elements, tag_letters("cab"));

    // Consumer: discovers exactly "cab" and completes the workitem.
    let report = run_consumer_once(&store, &dict, DEFAULT_MAX_INPUT_LEN)
        .await
        .unwrap()
        .expect("one workitem to process");
    assert_eq!(report.words_found, 1);
    let items = store.list_workitems_for_task(&task.id).await.unwrap();
    assert_eq!(items[0].status, WorkItemStatus::Completed);

    // Watcher: SCHEDULED -> RUNNING -> COMPLETED.
    run_watcher_tick(&store).await.unwrap();
    let done = store.get_task(&task.id).await.unwrap();
    assert_eq!(done.status, TaskStatus::Completed);
    assert!(done.started.is_some());
    assert!(done.completed.is_some());

    assert_eq!(store.words_for_task(&task.id), vec!["cab"]);

    // Once COMPLETED, further word appends are rejected.
    let err = store.append_word(&task.id, "cab").await.unwrap_err();
    assert!(matches!(err, Error::StateConflict(_)));
}

#[tokio::test]
async fn lifecycle_never_moves_backwards() {
    let store = MemoryStore::new();
    let task = store.create_task("abc");

    run_scheduler_tick(&store).await.unwrap();
    assert_eq!(
        store.get_task(&task.id).await.unwrap().status,
        TaskStatus::Scheduled
    );

    // No transition may reduce the status rank, from any stage.
    for backwards in [TaskStatus::New, TaskStatus::Scheduling] {
        let err = store
            .transition_task(&task.id, backwards, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StateConflict(_)));
    }
}

#[tokio::test]
async fn second_consumer_finds_no_workitem_left() {
    let store = MemoryStore::new();
    let dict = PrefixDictionary::from_words(["cab"]);
    store.create_task("cab");
    run_scheduler_tick(&store).await.unwrap();

    let first = run_consumer_once(&store, &dict, DEFAULT_MAX_INPUT_LEN)
        .await
        .unwrap();
    assert!(first.is_some());
    let second = run_consumer_once(&store, &dict, DEFAULT_MAX_INPUT_LEN)
        .await
        .unwrap();
    assert!(second.is_none());
}
