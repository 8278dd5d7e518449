//! Scripted in-memory Semaphore used by the service tests

use std::collections::{
    HashMap,
    VecDeque,
};
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::sync::Mutex;

use async_trait::async_trait;
use novadash_semaphore::{
    Project,
    SemaphoreApi,
    SemaphoreError,
    SemaphoreResult,
    ServerInfo,
    Task,
    TaskOutput,
    TaskStatus,
    Template,
};

pub(crate) fn template(id: i64, name: &str) -> Template {
    Template {
        id,
        project_id: 1,
        name: name.to_string(),
        playbook: None,
        description: None,
    }
}

pub(crate) fn task(id: i64, status: TaskStatus) -> Task {
    Task {
        id,
        project_id: 1,
        template_id: 5,
        status,
        start: None,
        end: None,
        message: String::new(),
        debug: false,
        dry_run: false,
        created: None,
    }
}

#[derive(Default)]
pub(crate) struct FakeSemaphore {
    pub online: bool,
    pub templates: Vec<Template>,
    /// Statuses served by successive `get_task` calls; the last one repeats
    pub status_script: Mutex<VecDeque<TaskStatus>>,
    /// Served by `get_tasks`
    pub history: Vec<Task>,
    /// Detail lookups by id when no status script is set
    pub details: HashMap<i64, Task>,
    pub output: Vec<TaskOutput>,
    pub fail_listing: bool,
    pub fail_templates: bool,
    pub run_calls: Mutex<Vec<(i64, i64, bool, bool)>>,
    pub stop_calls: Mutex<Vec<(i64, i64)>>,
    pub get_task_calls: AtomicUsize,
}

impl FakeSemaphore {
    pub fn with_templates(templates: Vec<Template>) -> Self {
        Self {
            online: true,
            templates,
            ..Default::default()
        }
    }

    pub fn with_status_script(statuses: Vec<TaskStatus>) -> Self {
        Self {
            online: true,
            status_script: Mutex::new(statuses.into()),
            ..Default::default()
        }
    }

    pub fn with_history(history: Vec<Task>) -> Self {
        let details = history.iter().map(|t| (t.id, t.clone())).collect();
        Self {
            online: true,
            history,
            details,
            ..Default::default()
        }
    }

    pub fn run_calls(&self) -> Vec<(i64, i64, bool, bool)> {
        self.run_calls.lock().unwrap().clone()
    }

    pub fn get_task_calls(&self) -> usize {
        self.get_task_calls.load(Ordering::SeqCst)
    }

    fn connection_error() -> SemaphoreError {
        SemaphoreError::ConnectionError {
            cause: "connection refused".to_string(),
            attempts: 3,
        }
    }
}

#[async_trait]
impl SemaphoreApi for FakeSemaphore {
    async fn ping(&self) -> bool {
        self.online
    }

    async fn get_info(&self) -> SemaphoreResult<ServerInfo> {
        Ok(ServerInfo {
            version: Some("v2.9.45".to_string()),
            extra: Default::default(),
        })
    }

    async fn get_projects(&self) -> SemaphoreResult<Vec<Project>> {
        Ok(vec![Project {
            id: 1,
            name: "homelab".to_string(),
            created: None,
        }])
    }

    async fn get_project(&self, project_id: i64) -> SemaphoreResult<Project> {
        Ok(Project {
            id: project_id,
            name: "homelab".to_string(),
            created: None,
        })
    }

    async fn get_templates(&self, _project_id: i64) -> SemaphoreResult<Vec<Template>> {
        if self.fail_templates {
            return Err(Self::connection_error());
        }
        Ok(self.templates.clone())
    }

    async fn get_template(&self, project_id: i64, template_id: i64) -> SemaphoreResult<Template> {
        self.templates
            .iter()
            .find(|t| t.id == template_id)
            .cloned()
            .ok_or_else(|| SemaphoreError::NotFound {
                path: format!("/project/{project_id}/templates/{template_id}"),
            })
    }

    async fn get_tasks(&self, _project_id: i64, limit: usize) -> SemaphoreResult<Vec<Task>> {
        if self.fail_listing {
            return Err(Self::connection_error());
        }
        Ok(self.history.iter().take(limit).cloned().collect())
    }

    async fn get_task(&self, project_id: i64, task_id: i64) -> SemaphoreResult<Task> {
        self.get_task_calls.fetch_add(1, Ordering::SeqCst);

        let mut script = self.status_script.lock().unwrap();
        if let Some(status) = script.front().copied() {
            if script.len() > 1 {
                script.pop_front();
            }
            return Ok(task(task_id, status));
        }

        self.details
            .get(&task_id)
            .cloned()
            .ok_or_else(|| SemaphoreError::NotFound {
                path: format!("/project/{project_id}/tasks/{task_id}"),
            })
    }

    async fn get_task_output(
        &self, _project_id: i64, _task_id: i64,
    ) -> SemaphoreResult<Vec<TaskOutput>> {
        Ok(self.output.clone())
    }

    async fn run_task(
        &self, project_id: i64, template_id: i64, debug: bool, dry_run: bool,
    ) -> SemaphoreResult<Task> {
        self.run_calls
            .lock()
            .unwrap()
            .push((project_id, template_id, debug, dry_run));

        let mut started = task(42, TaskStatus::Queued);
        started.project_id = project_id;
        started.template_id = template_id;
        started.debug = debug;
        started.dry_run = dry_run;
        Ok(started)
    }

    async fn stop_task(&self, project_id: i64, task_id: i64) -> SemaphoreResult<()> {
        self.stop_calls.lock().unwrap().push((project_id, task_id));
        Ok(())
    }

    fn task_url(&self, project_id: i64, task_id: i64) -> String {
        format!("http://semaphore.test/project/{project_id}/history?t={task_id}")
    }
}
