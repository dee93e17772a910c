use std::{
    marker::PhantomData,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use campaign::{
    stages::{design::ImageRequest, ImageGenerator, LanguageModel, TrendSource},
    Agent, AgentDescriptor, CampaignAgent, CampaignPipeline, CampaignRequest, CampaignStatus,
    EditedContent, GenerationStatus, ImageStore, PayloadKey, PipelineObserver, SeoContent, Stage,
    StageError, StageFn, StagePayload, StorageError, TrendData, VisualAssets, WrittenContent,
};

struct StaticTrends {
    keywords: Vec<&'static str>,
    fail: bool,
    calls: AtomicUsize,
}

impl StaticTrends {
    fn new(keywords: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            keywords,
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            keywords: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TrendSource for StaticTrends {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_trends(&self, _: &CampaignRequest) -> Result<Vec<String>, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StageError::collaborator(Stage::Trend, "BigQuery unavailable"));
        }
        Ok(self.keywords.iter().map(|k| k.to_string()).collect())
    }
}

#[derive(Default)]
struct CountingImages {
    calls: AtomicUsize,
}

#[async_trait]
impl ImageGenerator for CountingImages {
    async fn generate_image(&self, _: &ImageRequest) -> Result<Vec<u8>, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(b"\x89PNG".to_vec())
    }
}

#[derive(Default)]
struct MemoryStore {
    saved: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn save(&self, _: &[u8], name: &str) -> Result<String, StorageError> {
        self.saved.lock().unwrap().push(name.to_string());
        Ok(format!("mem://{}", name))
    }
}

struct BrokenModel {
    calls: AtomicUsize,
}

#[async_trait]
impl LanguageModel for BrokenModel {
    async fn complete(&self, _: &str, _: &str) -> Result<String, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StageError::collaborator(Stage::Edit, "model overloaded"))
    }
}

#[derive(Default)]
struct Collector {
    completed: Mutex<Vec<PayloadKey>>,
    failed: Mutex<Vec<Stage>>,
}

impl PipelineObserver for Collector {
    fn stage_completed(&self, _: &AgentDescriptor, payload: &StagePayload, _: u64) {
        self.completed.lock().unwrap().push(payload.key());
    }

    fn stage_failed(&self, agent: &AgentDescriptor, _: &StageError) {
        self.failed.lock().unwrap().push(agent.stage);
    }
}

fn request() -> CampaignRequest {
    CampaignRequest::new("AI tools and automation").unwrap()
}

#[tokio::test]
async fn complete_run_produces_all_payloads() {
    let images = Arc::new(CountingImages::default());
    let store = Arc::new(MemoryStore::default());
    let collector = Arc::new(Collector::default());
    let pipeline = CampaignPipeline::standard(
        StaticTrends::new(vec!["AI", "automation"]),
        images.clone(),
        store.clone(),
        None,
        10,
    )
    .with_observer(collector.clone());

    let record = pipeline.run(&request()).await;

    assert!(record.is_complete());
    assert_eq!(record.status(), &CampaignStatus::Completed);
    assert_eq!(record.error(), None);
    assert_eq!(
        record.summary(),
        "Complete marketing campaign for: AI tools and automation"
    );
    assert_eq!(record.payloads().len(), 5);
    assert_eq!(record.stages().len(), 5);
    assert_eq!(
        *collector.completed.lock().unwrap(),
        vec![
            PayloadKey::TrendData,
            PayloadKey::WrittenContent,
            PayloadKey::VisualAssets,
            PayloadKey::EditedContent,
            PayloadKey::SeoOptimizedContent,
        ]
    );

    let copy = record.copy().unwrap();
    assert!(copy.blog.contains("AI, automation"));
    assert_eq!(copy.email, "Subject: Stay ahead with AI, automation");

    let visuals = record.visuals().unwrap();
    assert_eq!(visuals.generation_status, GenerationStatus::Success);
    assert_eq!(visuals.infographic_url, "mem://infographic.png");
    assert_eq!(images.calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        *store.saved.lock().unwrap(),
        vec!["infographic.png", "social_banner.png"]
    );

    let seo = record.seo().unwrap();
    assert_eq!(
        seo.blog,
        "[SEO Optimized] Explore the future of AI, automation in our latest blog!"
    );
    assert_eq!(seo.email, record.edited().unwrap().email);
}

#[tokio::test]
async fn empty_keywords_still_complete() {
    let pipeline = CampaignPipeline::standard(
        StaticTrends::new(Vec::new()),
        Arc::new(CountingImages::default()),
        Arc::new(MemoryStore::default()),
        None,
        10,
    );

    let record = pipeline.run(&request()).await;

    assert!(record.is_complete());
    assert!(record.trends().unwrap().trending_keywords.is_empty());
    assert_eq!(
        record.copy().unwrap().blog,
        "Explore the future of  in our latest blog!"
    );
}

#[tokio::test]
async fn trend_failure_skips_remaining_stages() {
    let trends = StaticTrends::failing();
    let images = Arc::new(CountingImages::default());
    let collector = Arc::new(Collector::default());
    let pipeline = CampaignPipeline::standard(
        trends.clone(),
        images.clone(),
        Arc::new(MemoryStore::default()),
        None,
        10,
    )
    .with_observer(collector.clone());

    let record = pipeline.run(&request()).await;

    assert!(!record.is_complete());
    assert!(record.payloads().is_empty());
    assert!(record.error().unwrap().contains("BigQuery unavailable"));
    assert_eq!(
        record.summary(),
        "Failed to create campaign for: AI tools and automation"
    );
    assert!(matches!(
        record.status(),
        CampaignStatus::Failed {
            stage: Stage::Trend,
            ..
        }
    ));
    assert_eq!(trends.calls.load(Ordering::SeqCst), 1);
    assert_eq!(images.calls.load(Ordering::SeqCst), 0);
    assert_eq!(*collector.failed.lock().unwrap(), vec![Stage::Trend]);
}

#[tokio::test]
async fn editor_failure_keeps_earlier_payloads() {
    let model = Arc::new(BrokenModel {
        calls: AtomicUsize::new(0),
    });
    let images = Arc::new(CountingImages::default());
    let pipeline = CampaignPipeline::standard(
        StaticTrends::new(vec!["AI"]),
        images.clone(),
        Arc::new(MemoryStore::default()),
        Some(model.clone() as Arc<dyn LanguageModel>),
        10,
    );

    let record = pipeline.run(&request()).await;

    assert!(!record.is_complete());
    assert!(record.trends().is_some());
    assert!(record.copy().is_some());
    assert!(record.visuals().is_some());
    assert!(record.edited().is_none());
    assert!(record.seo().is_none());
    assert_eq!(record.payloads().len(), 3);
    assert_eq!(record.stages().len(), 3);
    assert!(record.error().unwrap().contains("model overloaded"));
    // the editor stops at the first failing field
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    // design ran before the failure and its side effects stand
    assert_eq!(images.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn keywords_capped_and_deduplicated() {
    let pipeline = CampaignPipeline::standard(
        StaticTrends::new(vec!["AI", "ai", " automation ", "", "robots", "agents"]),
        Arc::new(CountingImages::default()),
        Arc::new(MemoryStore::default()),
        None,
        2,
    );

    let record = pipeline.run(&request()).await;

    assert_eq!(
        record.trends().unwrap().trending_keywords,
        vec!["AI", "automation"]
    );
}

/// Stage stand-in that counts its calls and either fails or returns a default payload
struct CountingStage<I, O> {
    stage: Stage,
    fail: bool,
    calls: Arc<AtomicUsize>,
    _io: PhantomData<fn(I) -> O>,
}

impl<I, O> CountingStage<I, O> {
    fn new(stage: Stage, fail: bool, calls: Arc<AtomicUsize>) -> Self {
        Self {
            stage,
            fail,
            calls,
            _io: PhantomData,
        }
    }
}

#[async_trait]
impl<I, O> StageFn for CountingStage<I, O>
where
    I: for<'a> TryFrom<&'a StagePayload, Error = PayloadKey> + Send + 'static,
    O: Into<StagePayload> + Default + Send + 'static,
{
    type Input = I;
    type Output = O;

    fn stage(&self) -> Stage {
        self.stage
    }

    async fn call(&self, _: I) -> Result<O, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StageError::collaborator(self.stage, "stage unavailable"));
        }
        Ok(O::default())
    }
}

/// Five counting agents wired like the standard pipeline; `failing` is a 1-based stage order
fn counting_pipeline(failing: Option<usize>) -> (CampaignPipeline, Vec<Arc<AtomicUsize>>) {
    let calls: Vec<Arc<AtomicUsize>> = (0..5).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let fails = |order: usize| failing == Some(order);

    let agents: Vec<Arc<dyn CampaignAgent>> = vec![
        Arc::new(Agent::new(
            AgentDescriptor::trend(),
            CountingStage::<CampaignRequest, TrendData>::new(
                Stage::Trend,
                fails(1),
                calls[0].clone(),
            ),
        )),
        Arc::new(Agent::new(
            AgentDescriptor::copywriter(),
            CountingStage::<TrendData, WrittenContent>::new(
                Stage::Copy,
                fails(2),
                calls[1].clone(),
            ),
        )),
        Arc::new(Agent::new(
            AgentDescriptor::designer(),
            CountingStage::<WrittenContent, VisualAssets>::new(
                Stage::Design,
                fails(3),
                calls[2].clone(),
            ),
        )),
        Arc::new(Agent::new(
            AgentDescriptor::editor(),
            CountingStage::<WrittenContent, EditedContent>::new(
                Stage::Edit,
                fails(4),
                calls[3].clone(),
            ),
        )),
        Arc::new(Agent::new(
            AgentDescriptor::seo(),
            CountingStage::<EditedContent, SeoContent>::new(
                Stage::Seo,
                fails(5),
                calls[4].clone(),
            ),
        )),
    ];
    (CampaignPipeline::new(agents), calls)
}

#[tokio::test]
async fn failure_at_any_stage_skips_every_later_stage() {
    for failing in 1..=5 {
        let (pipeline, calls) = counting_pipeline(Some(failing));

        let record = pipeline.run(&request()).await;

        for (index, counter) in calls.iter().enumerate() {
            let expected = if index < failing { 1 } else { 0 };
            assert_eq!(
                counter.load(Ordering::SeqCst),
                expected,
                "stage {} calls when stage {} fails",
                index + 1,
                failing
            );
        }
        assert!(!record.is_complete());
        assert_eq!(record.payloads().len(), failing - 1);
        assert_eq!(record.stages().len(), failing - 1);
        match record.status() {
            CampaignStatus::Failed { stage, message } => {
                assert_eq!(*stage, Stage::ALL[failing - 1]);
                assert!(message.contains("stage unavailable"));
            }
            other => panic!("expected failure at stage {}, got {:?}", failing, other),
        }
    }
}

#[tokio::test]
async fn counting_pipeline_without_failure_completes() {
    let (pipeline, calls) = counting_pipeline(None);

    let record = pipeline.run(&request()).await;

    assert!(record.is_complete());
    assert_eq!(record.payloads().len(), 5);
    assert!(calls.iter().all(|c| c.load(Ordering::SeqCst) == 1));
}
