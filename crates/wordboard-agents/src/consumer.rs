use tracing::info;
use wordboard_core::model::WorkItemStatus;
use wordboard_core::oracle::WordOracle;
use wordboard_core::store::BlackboardStore;
use wordboard_core::subsequence::WordSearch;
use wordboard_core::Error;

/// What a single consumer invocation did.
#[derive(Debug)]
pub struct ConsumerReport {
    pub workitem_id: String,
    pub task_id: String,
    pub words_found: usize,
}

/// One consumer invocation: claim one NEW workitem, run the
/// dictionary-pruned search over its remaining elements and append every
/// discovered word to the owning task.
///
/// Returns `Ok(None)` when there is nothing to process. The word-append
/// loop aborts on the first failure with no partial retry, leaving the
/// workitem RUNNING so the failure stays attributable; re-running it later
/// re-enumerates from scratch and re-appends words already inserted, since
/// word storage has no dedup.
pub async fn run_consumer_once(
    store: &dyn BlackboardStore,
    oracle: &dyn WordOracle,
    max_input_length: usize,
) -> Result<Option<ConsumerReport>, Error> {
    let items = store.list_workitems(Some(WorkItemStatus::New)).await?;
    let Some(item) = items.into_iter().next() else {
        return Ok(None);
    };
    info!("processing workitem {} (task {})", item.id, item.task_id);

    store
        .transition_workitem(&item.id, WorkItemStatus::Running, Some(WorkItemStatus::New))
        .await?;

    let mut search = WordSearch::new(item.remaining_elements.clone(), 0, max_input_length)?;
    let mut words_found = 0;
    while let Some(word) = search.next_word(oracle).await? {
        store.append_word(&item.task_id, &word).await?;
        words_found += 1;
    }

    store
        .transition_workitem(&item.id, WorkItemStatus::Completed, None)
        .await?;

    Ok(Some(ConsumerReport {
        workitem_id: item.id,
        task_id: item.task_id,
        words_found,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::run_scheduler_tick;
    use wordboard_core::memory::MemoryStore;
    use wordboard_core::subsequence::DEFAULT_MAX_INPUT_LEN;
    use wordboard_core::trie::PrefixDictionary;

    async fn scheduled_task(store: &MemoryStore, letters: &str) -> String {
        let task = store.create_task(letters);
        run_scheduler_tick(store).await.unwrap();
        task.id
    }

    #[tokio::test]
    async fn discovers_exactly_the_contained_words() {
        let store = MemoryStore::new();
        let dict = PrefixDictionary::from_words(["cab", "zebra"]);
        let task_id = scheduled_task(&store, "cab").await;

        let report = run_consumer_once(&store, &dict, DEFAULT_MAX_INPUT_LEN)
            .await
            .unwrap()
            .expect("one workitem to process");
        assert_eq!(report.task_id, task_id);
        assert_eq!(report.words_found, 1);
        assert_eq!(store.words_for_task(&task_id), vec!["cab"]);

        let item = store.get_workitem(&report.workitem_id).await.unwrap();
        assert_eq!(item.status, WorkItemStatus::Completed);
    }

    #[tokio::test]
    async fn nothing_to_process_returns_none() {
        let store = MemoryStore::new();
        let dict = PrefixDictionary::new();
        let outcome = run_consumer_once(&store, &dict, DEFAULT_MAX_INPUT_LEN)
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn rerun_after_interruption_duplicates_words() {
        let store = MemoryStore::new();
        let dict = PrefixDictionary::from_words(["cab"]);
        let task_id = scheduled_task(&store, "cab").await;

        // An earlier, interrupted run already appended the word.
        store.append_word(&task_id, "cab").await.unwrap();

        run_consumer_once(&store, &dict, DEFAULT_MAX_INPUT_LEN)
            .await
            .unwrap()
            .expect("workitem to process");

        // Documented behavior: append-only word storage, no dedup.
        assert_eq!(store.words_for_task(&task_id), vec!["cab", "cab"]);
    }

    #[tokio::test]
    async fn oversized_workitem_fails_and_stays_running() {
        let store = MemoryStore::new();
        let dict = PrefixDictionary::new();
        let task_id = scheduled_task(&store, "abcdefghi").await;

        let err = run_consumer_once(&store, &dict, DEFAULT_MAX_INPUT_LEN)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let items = store.list_workitems_for_task(&task_id).await.unwrap();
        assert_eq!(items[0].status, WorkItemStatus::Running);
    }
}
