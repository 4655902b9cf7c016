use crate::{
    contract::{
        ContractBinder,
        WagerContract,
        WagerRecord,
    },
    wallets::WalletConnector,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use futures::future::join_all;
use std::fmt;
use tracing::{
    debug,
    error,
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LoadingStatus {
    #[default]
    NotLoaded,
    Loaded,
}

impl fmt::Display for LoadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadingStatus::NotLoaded => "not-loaded",
            LoadingStatus::Loaded => "loaded",
        };
        write!(f, "{name}")
    }
}

/// What the view gets to see.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PageSnapshot {
    pub status: LoadingStatus,
    pub wagers: Vec<WagerRecord>,
}

/// Owns the page state. Only `load_wagers` mutates it.
pub struct PageController<W, B> {
    connector: W,
    binder: B,
    status: LoadingStatus,
    wagers: Vec<WagerRecord>,
}

impl<W, B> PageController<W, B>
where
    W: WalletConnector,
    B: ContractBinder<W::Connection>,
{
    pub fn new(connector: W, binder: B) -> Self {
        Self {
            connector,
            binder,
            status: LoadingStatus::default(),
            wagers: Vec::new(),
        }
    }

    pub fn status(&self) -> LoadingStatus {
        self.status
    }

    pub fn wagers(&self) -> &[WagerRecord] {
        &self.wagers
    }

    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            status: self.status,
            wagers: self.wagers.clone(),
        }
    }

    /// Runs the load once and swallows any failure after logging it. The
    /// page keeps whatever it showed before.
    pub async fn mount(&mut self) {
        if let Err(err) = self.load_wagers().await {
            error!(error = ?err, "failed to load wagers");
        }
    }

    /// Connect, bind, read, publish. State is only touched once the read has
    /// succeeded, apart from the status reset at the start.
    pub async fn load_wagers(&mut self) -> Result<()> {
        self.status = LoadingStatus::NotLoaded;

        let connection = self
            .connector
            .connect()
            .await
            .wrap_err("wallet connection failed")?;
        let contract = self.binder.bind(connection);
        let latest = contract
            .get_latest_wagers()
            .await
            .wrap_err("reading latest wagers failed")?;

        self.wagers = pass_through(latest).await;
        self.status = LoadingStatus::Loaded;
        Ok(())
    }
}

/// Per-wager hook. Currently only logs; every record comes back untouched and
/// in its original position.
pub async fn pass_through(wagers: Vec<WagerRecord>) -> Vec<WagerRecord> {
    join_all(wagers.into_iter().map(|wager| async move {
        debug!(%wager, "wager");
        wager
    }))
    .await
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use color_eyre::eyre::eyre;
    use proptest::prelude::*;
    use std::{
        collections::VecDeque,
        sync::{
            Arc,
            Mutex,
            atomic::{
                AtomicUsize,
                Ordering,
            },
        },
    };
    use tracing::{
        Event,
        Level,
        Subscriber,
    };
    use tracing_subscriber::{
        Layer,
        layer::{
            Context,
            SubscriberExt,
        },
    };

    struct ErrorCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn error_counting_subscriber() -> (impl Subscriber + Send + Sync, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber =
            tracing_subscriber::registry().with(ErrorCounter(count.clone()));
        (subscriber, count)
    }

    struct FakeConnection;

    #[derive(Clone, Default)]
    struct FakeConnector {
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl FakeConnector {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }
    }

    impl WalletConnector for FakeConnector {
        type Connection = FakeConnection;

        async fn connect(&self) -> Result<FakeConnection> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(eyre!("user rejected the connection"))
            } else {
                Ok(FakeConnection)
            }
        }
    }

    type Scripted = Result<Vec<Vec<u8>>, String>;

    /// Serves scripted `get_latest_wagers` results in order and remembers the
    /// buffer address of every record it handed out.
    #[derive(Clone, Default)]
    struct FakeBinder {
        responses: Arc<Mutex<VecDeque<Scripted>>>,
        served: Arc<Mutex<Vec<usize>>>,
        binds: Arc<AtomicUsize>,
    }

    impl FakeBinder {
        fn with_responses(responses: Vec<Scripted>) -> Self {
            Self {
                responses: Arc::new(Mutex::new(responses.into())),
                ..Self::default()
            }
        }
    }

    struct FakeContract {
        binder: FakeBinder,
    }

    impl ContractBinder<FakeConnection> for FakeBinder {
        type Contract = FakeContract;

        fn bind(&self, _connection: FakeConnection) -> FakeContract {
            self.binds.fetch_add(1, Ordering::SeqCst);
            FakeContract {
                binder: self.clone(),
            }
        }
    }

    impl WagerContract for FakeContract {
        async fn get_latest_wagers(&self) -> Result<Vec<WagerRecord>> {
            let next = self
                .binder
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected get_latest_wagers call");
            let raw = next.map_err(|msg| eyre!(msg))?;
            let records: Vec<WagerRecord> =
                raw.into_iter().map(WagerRecord::from).collect();
            let mut served = self.binder.served.lock().unwrap();
            served.clear();
            served.extend(records.iter().map(|r| r.as_bytes().as_ptr() as usize));
            Ok(records)
        }
    }

    fn records(raw: &[&str]) -> Vec<WagerRecord> {
        raw.iter().map(|r| WagerRecord::from(r.as_bytes().to_vec())).collect()
    }

    #[test]
    fn new__starts_not_loaded_with_no_wagers() {
        // when
        let page = PageController::new(FakeConnector::default(), FakeBinder::default());

        // then
        assert_eq!(page.status(), LoadingStatus::NotLoaded);
        assert!(page.wagers().is_empty());
        assert_eq!(page.snapshot(), PageSnapshot::default());
    }

    #[tokio::test]
    async fn mount__publishes_wagers_in_order_and_marks_loaded() {
        // given
        let binder = FakeBinder::with_responses(vec![Ok(vec![
            b"A".to_vec(),
            b"B".to_vec(),
            b"C".to_vec(),
        ])]);
        let mut page = PageController::new(FakeConnector::default(), binder);

        // when
        page.mount().await;

        // then
        assert_eq!(page.wagers(), records(&["A", "B", "C"]).as_slice());
        assert_eq!(page.status(), LoadingStatus::Loaded);
    }

    #[tokio::test]
    async fn mount__wallet_failure_leaves_page_untouched_and_logs_once() {
        // given
        let (subscriber, errors) = error_counting_subscriber();
        let _guard = tracing::subscriber::set_default(subscriber);
        let binder = FakeBinder::default();
        let binds = binder.binds.clone();
        let mut page = PageController::new(FakeConnector::failing(), binder);

        // when
        page.mount().await;

        // then
        assert_eq!(page.status(), LoadingStatus::NotLoaded);
        assert!(page.wagers().is_empty());
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(binds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn mount__read_failure_keeps_previous_wagers_and_logs_once() {
        // given
        let binder = FakeBinder::with_responses(vec![
            Ok(vec![b"A".to_vec()]),
            Err("node unreachable".to_string()),
        ]);
        let mut page = PageController::new(FakeConnector::default(), binder);
        page.mount().await;
        assert_eq!(page.status(), LoadingStatus::Loaded);
        let (subscriber, errors) = error_counting_subscriber();
        let _guard = tracing::subscriber::set_default(subscriber);

        // when
        page.mount().await;

        // then
        assert_eq!(page.wagers(), records(&["A"]).as_slice());
        assert_eq!(page.status(), LoadingStatus::NotLoaded);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn mount__success_logs_no_errors() {
        // given
        let (subscriber, errors) = error_counting_subscriber();
        let _guard = tracing::subscriber::set_default(subscriber);
        let binder = FakeBinder::with_responses(vec![Ok(vec![b"A".to_vec()])]);
        let mut page = PageController::new(FakeConnector::default(), binder);

        // when
        page.mount().await;

        // then
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn load_wagers__second_load_replaces_first() {
        // given
        let binder = FakeBinder::with_responses(vec![
            Ok(vec![b"A".to_vec(), b"B".to_vec()]),
            Ok(vec![b"C".to_vec()]),
        ]);
        let connector = FakeConnector::default();
        let connects = connector.calls.clone();
        let mut page = PageController::new(connector, binder);

        // when
        page.load_wagers().await.unwrap();
        page.load_wagers().await.unwrap();

        // then
        assert_eq!(page.wagers(), records(&["C"]).as_slice());
        assert_eq!(page.status(), LoadingStatus::Loaded);
        assert_eq!(connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn load_wagers__empty_result_still_counts_as_loaded() {
        // given
        let binder = FakeBinder::with_responses(vec![
            Ok(vec![b"A".to_vec()]),
            Ok(Vec::new()),
        ]);
        let mut page = PageController::new(FakeConnector::default(), binder);
        page.load_wagers().await.unwrap();

        // when
        page.load_wagers().await.unwrap();

        // then
        assert!(page.wagers().is_empty());
        assert_eq!(page.status(), LoadingStatus::Loaded);
    }

    #[tokio::test]
    async fn load_wagers__publishes_the_same_records_the_contract_returned() {
        // given
        let binder = FakeBinder::with_responses(vec![Ok(vec![
            vec![1, 2, 3],
            vec![4, 5],
            vec![6],
        ])]);
        let served = binder.served.clone();
        let mut page = PageController::new(FakeConnector::default(), binder);

        // when
        page.load_wagers().await.unwrap();

        // then
        let published: Vec<usize> = page
            .wagers()
            .iter()
            .map(|r| r.as_bytes().as_ptr() as usize)
            .collect();
        assert_eq!(published, *served.lock().unwrap());
    }

    #[tokio::test]
    async fn load_wagers__names_the_failing_step() {
        // given
        let mut rejected =
            PageController::new(FakeConnector::failing(), FakeBinder::default());
        let mut unreachable = PageController::new(
            FakeConnector::default(),
            FakeBinder::with_responses(vec![Err("call reverted".to_string())]),
        );

        // when
        let wallet_err = rejected.load_wagers().await.unwrap_err();
        let read_err = unreachable.load_wagers().await.unwrap_err();

        // then
        assert_eq!(wallet_err.to_string(), "wallet connection failed");
        assert_eq!(read_err.to_string(), "reading latest wagers failed");
        assert_eq!(read_err.root_cause().to_string(), "call reverted");
    }

    #[test]
    fn loading_status__displays_wire_names() {
        assert_eq!(LoadingStatus::NotLoaded.to_string(), "not-loaded");
        assert_eq!(LoadingStatus::Loaded.to_string(), "loaded");
    }

    proptest! {
        #[test]
        fn pass_through__returns_every_record_in_place(
            raw in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 0..32)
        ) {
            let input: Vec<WagerRecord> =
                raw.into_iter().map(WagerRecord::from).collect();
            let expected = input.clone();
            let ptrs: Vec<usize> =
                input.iter().map(|r| r.as_bytes().as_ptr() as usize).collect();

            let output = futures::executor::block_on(pass_through(input));

            let out_ptrs: Vec<usize> =
                output.iter().map(|r| r.as_bytes().as_ptr() as usize).collect();
            prop_assert_eq!(output, expected);
            prop_assert_eq!(out_ptrs, ptrs);
        }
    }
}
