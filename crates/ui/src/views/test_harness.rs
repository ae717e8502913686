use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};

use academy_core::model::{
    ChoiceDraft, Module, ModuleDraft, ModuleKind, QuestionDraft, QuizDraft, Role,
};
use academy_core::time::fixed_clock;
use api::InMemoryBackend;
use services::{AppServices, AuthState};

use crate::context::{UiApp, build_app_context};
use crate::views::quiz::{QuizIntent, quiz_page, use_quiz_controller};
use crate::views::{
    DashboardView, LandingView, ModuleDetailView, ModuleEditView, ModuleListView, QuizView,
};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Landing,
    Dashboard,
    Modules,
    ModuleDetail(u64),
    ModuleEdit(u64),
    Quiz(u64),
    /// Quiz screen without the route guard, driven through [`QuizIntent`]s.
    QuizIntents(u64),
}

#[derive(Clone, Default)]
pub struct HarnessHandles {
    quiz: Rc<RefCell<Option<Callback<QuizIntent>>>>,
}

impl HarnessHandles {
    fn quiz_dispatch(&self) -> Callback<QuizIntent> {
        (*self.quiz.borrow()).expect("quiz dispatch registered")
    }
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<AppServices>,
    auth: AuthState,
    view: ViewKind,
    handles: HarnessHandles,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| Signal::new(props.auth.clone()));
    use_context_provider(|| props.view);
    use_context_provider(|| props.handles.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Landing => rsx! { LandingView {} },
        ViewKind::Dashboard => rsx! { DashboardView {} },
        ViewKind::Modules => rsx! { ModuleListView {} },
        ViewKind::ModuleDetail(id) => rsx! { ModuleDetailView { id } },
        ViewKind::ModuleEdit(id) => rsx! { ModuleEditView { id } },
        ViewKind::Quiz(id) => rsx! { QuizView { id } },
        ViewKind::QuizIntents(id) => rsx! { QuizIntentHarness { id } },
    }
}

#[component]
fn QuizIntentHarness(id: u64) -> Element {
    let handles = use_context::<HarnessHandles>();
    let quiz = use_quiz_controller(id);
    use_hook(|| *handles.quiz.borrow_mut() = Some(quiz.dispatch));
    quiz_page(id, quiz)
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub backend: InMemoryBackend,
    pub services: Arc<AppServices>,
    pub handles: HarnessHandles,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Let spawned loads and resources settle.
    pub async fn settle(&mut self) {
        for _ in 0..4 {
            self.drive_async().await;
        }
    }

    /// Dispatch `intent` to the mounted quiz screen and let it re-render.
    pub async fn dispatch_quiz(&mut self, intent: QuizIntent) {
        let dispatch = self.handles.quiz_dispatch();
        self.dom.in_runtime(|| dispatch.call(intent));
        drive_dom(&mut self.dom);
        self.settle().await;
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn backend() -> InMemoryBackend {
    InMemoryBackend::standalone().with_clock(fixed_clock())
}

pub fn seed_text_module(backend: &InMemoryBackend, title: &str) -> Module {
    backend
        .seed_module(ModuleDraft {
            title: title.to_string(),
            content: format!("## {title}\n\nRead this first."),
            kind: ModuleKind::Text,
        })
        .expect("seed module")
}

pub fn seed_quiz(backend: &InMemoryBackend, module: &Module, questions: usize) {
    let draft = QuizDraft {
        title: format!("{} quiz", module.title),
        questions: (1..=questions)
            .map(|n| QuestionDraft {
                text: format!("Question {n}?"),
                order: None,
                choices: vec![
                    ChoiceDraft {
                        text: "Yes".into(),
                        is_correct: true,
                        order: None,
                    },
                    ChoiceDraft {
                        text: "No".into(),
                        is_correct: false,
                        order: None,
                    },
                ],
            })
            .collect(),
    };
    backend.seed_quiz(module.id, &draft).expect("seed quiz");
}

/// Mount `view` over `backend`, signed in as `role` when given.
pub async fn setup_view_harness(
    view: ViewKind,
    backend: InMemoryBackend,
    role: Option<Role>,
) -> ViewHarness {
    if let Some(role) = role {
        backend.sign_in_as(role).expect("sign in");
    }
    let services = Arc::new(AppServices::in_memory(backend.clone(), fixed_clock()));
    let auth = services.auth().init().await.expect("init auth");
    let handles = HarnessHandles::default();

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app: Arc::clone(&services),
            auth,
            view,
            handles: handles.clone(),
        },
    );

    ViewHarness {
        dom,
        backend,
        services,
        handles,
    }
}
