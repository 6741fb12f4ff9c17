//! 集成测试用的假模型

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use menu_photographer::clients::{
    ContentPart, ImageModel, ImageRequest, ImageResponse, ImageTask, StructuredRequest, TextModel,
};
use menu_photographer::error::ApiError;
use menu_photographer::models::ImagePayload;
use menu_photographer::{Config, DishId, ModelGateway, Session, StaticKeyGate};
use tokio::sync::Notify;
use tokio::time::{sleep, timeout, Duration};

/// 固定回复的文本模型
///
/// `hanging` 为真时新的调用永远不返回
pub struct FakeText {
    reply: Mutex<String>,
    hanging: AtomicBool,
    pub calls: AtomicUsize,
    pub last_prompt: Mutex<Option<String>>,
}

impl FakeText {
    pub fn new(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(reply.into()),
            hanging: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        })
    }

    pub fn hanging(reply: impl Into<String>) -> Arc<Self> {
        let text = Self::new(reply);
        text.set_hanging(true);
        text
    }

    pub fn set_hanging(&self, hanging: bool) {
        self.hanging.store(hanging, Ordering::SeqCst);
    }

    pub fn set_reply(&self, reply: impl Into<String>) {
        *self.reply.lock().unwrap() = reply.into();
    }
}

#[async_trait]
impl TextModel for FakeText {
    async fn complete_structured(&self, request: StructuredRequest) -> Result<String, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(request.user_message);
        if self.hanging.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(self.reply.lock().unwrap().clone())
    }
}

/// 可控的图片模型
///
/// - 提示词中包含 `fail_names` 里的菜名时不返回图片
/// - `fail_edits` 为真时编辑请求不返回图片
/// - 设置了 `hold` 后每次调用先通知 `entered`，再等待 `release`
#[derive(Default)]
pub struct FakeImages {
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<ImageRequest>>,
    pub fail_names: Mutex<Vec<String>>,
    pub fail_edits: AtomicBool,
    pub hold: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl FakeImages {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn holding(entered: Arc<Notify>, release: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            hold: Some((entered, release)),
            ..Default::default()
        })
    }

    pub fn fail_for(&self, name: &str) {
        self.fail_names.lock().unwrap().push(name.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ImageRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

fn prompt_text(request: &ImageRequest) -> String {
    request
        .parts
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text(text) => Some(text.as_str()),
            ContentPart::Image(_) => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl ImageModel for FakeImages {
    async fn generate_content(&self, request: ImageRequest) -> Result<ImageResponse, ApiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());

        if let Some((entered, release)) = &self.hold {
            entered.notify_one();
            release.notified().await;
        }

        let text = prompt_text(&request);
        let should_fail = match request.task {
            ImageTask::Edit => self.fail_edits.load(Ordering::SeqCst),
            ImageTask::Synthesis => self
                .fail_names
                .lock()
                .unwrap()
                .iter()
                .any(|name| text.contains(name.as_str())),
        };

        if should_fail {
            return Ok(ImageResponse {
                parts: vec![ContentPart::Text("I can't draw that.".to_string())],
            });
        }

        Ok(ImageResponse {
            parts: vec![
                ContentPart::Text("Here you go".to_string()),
                ContentPart::Image(ImagePayload::from_bytes(
                    "image/png",
                    format!("image-{}", call).as_bytes(),
                )),
            ],
        })
    }
}

pub const MENU_REPLY: &str = r#"{"dishes":[
    {"name":"Burger","description":"beef patty, lettuce, tomato"},
    {"name":"Fries","description":"crispy golden fries"},
    {"name":"Cheesecake","description":"creamy New York style slice"}
]}"#;

pub fn test_config() -> Config {
    Config {
        api_key: "test-key".to_string(),
        max_concurrent_generations: 0,
        ..Default::default()
    }
}

pub fn session_with(
    text: Arc<FakeText>,
    images: Arc<FakeImages>,
    authorized: bool,
) -> Arc<Session> {
    let gateway = ModelGateway::new(text, images);
    Arc::new(Session::new(
        gateway,
        Arc::new(StaticKeyGate::new(authorized)),
        &test_config(),
    ))
}

/// 等待菜品回到 Idle（后台任务写回结果）
pub async fn wait_until_idle(session: &Session, id: DishId) {
    let settled = timeout(Duration::from_secs(5), async {
        while session.dish(id).is_some_and(|dish| !dish.state.is_idle()) {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(settled.is_ok(), "菜品 {} 没有回到 Idle", id);
}

/// 等待菜单解析进入在途状态
pub async fn wait_until_extracting(session: &Session) {
    let started = timeout(Duration::from_secs(5), async {
        while !session.is_extracting() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(started.is_ok(), "菜单解析没有开始");
}
