#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;
use tiny_http::{Header, Method, Response, Server, StatusCode};

const SCRUBBED_ENV: &[&str] = &[
    "PROJECT_NAME",
    "INVENTORY_FILE",
    "SCM_INVENTORY_CONFIG",
    "SCM_INVENTORY_LOG",
    "TOWER_USERNAME",
    "TOWER_PASSWORD",
    "TOWER_OAUTH_TOKEN",
    "TOWER_VERIFY_SSL",
    "TOWER_API_VERSION",
    "UPDATE_WAIT_RETRIES",
];

#[derive(Clone)]
pub struct MockProject {
    pub id: u64,
    pub name: String,
    pub local_path: Option<String>,
    /// Number of detail requests answered with a linked `current_update`.
    pub running_polls: usize,
}

impl MockProject {
    pub fn new(id: u64, name: &str, local_path: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            local_path: Some(local_path.to_string()),
            running_polls: 0,
        }
    }

    pub fn running_for(mut self, polls: usize) -> Self {
        self.running_polls = polls;
        self
    }

    fn to_json(&self, running: bool) -> Value {
        let mut related = json!({
            "last_update": format!("/api/v2/project_updates/{}/", self.id * 10),
        });
        if running {
            related["current_update"] = json!(format!("/api/v2/project_updates/{}/", self.id * 10 + 1));
        }
        json!({
            "id": self.id,
            "type": "project",
            "name": self.name,
            "local_path": self.local_path,
            "scm_type": "git",
            "status": if running { "running" } else { "successful" },
            "related": related,
        })
    }
}

pub struct MockApi {
    pub base: String,
    detail_requests: Arc<AtomicUsize>,
    last_authorization: Arc<Mutex<Option<String>>>,
}

impl MockApi {
    pub fn detail_requests(&self) -> usize {
        self.detail_requests.load(Ordering::SeqCst)
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.last_authorization.lock().expect("auth lock").clone()
    }
}

/// Splits a request target into its path and the `name` query value.
fn route(target: &str) -> Option<(String, Option<String>)> {
    let url = reqwest::Url::parse(&format!("http://mock{target}")).ok()?;
    let name = url
        .query_pairs()
        .find(|(k, _)| k == "name")
        .map(|(_, v)| v.into_owned());
    Some((url.path().to_string(), name))
}

fn json_response(status: u16, body: Value) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body.to_string())
        .with_status_code(StatusCode(status))
        .with_header(
            Header::from_bytes("Content-Type", "application/json").expect("content type header"),
        )
}

/// Serves `projects/?name=` and `projects/<id>/` under `/api/v2/`.
pub fn spawn_api(projects: Vec<MockProject>) -> MockApi {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let addr = server.server_addr().to_ip().expect("tcp listener");
    let base = format!("http://{addr}");
    let detail_requests = Arc::new(AtomicUsize::new(0));
    let last_authorization = Arc::new(Mutex::new(None));

    let details = Arc::clone(&detail_requests);
    let auth = Arc::clone(&last_authorization);
    thread::spawn(move || {
        for request in server.incoming_requests() {
            if let Some(h) = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Authorization"))
            {
                *auth.lock().expect("auth lock") = Some(h.value.as_str().to_string());
            }
            if request.method() != &Method::Get {
                let _ = request.respond(json_response(405, json!({"detail": "method"})));
                continue;
            }

            let Some((path, name)) = route(request.url()) else {
                let _ = request.respond(json_response(400, json!({"detail": "bad url"})));
                continue;
            };
            let response = if path == "/api/v2/projects/" {
                let results: Vec<Value> = projects
                    .iter()
                    .filter(|p| name.as_deref() == Some(p.name.as_str()))
                    .map(|p| p.to_json(false))
                    .collect();
                json_response(200, json!({"count": results.len(), "results": results}))
            } else if let Some(id) = path
                .strip_prefix("/api/v2/projects/")
                .and_then(|rest| rest.trim_end_matches('/').parse::<u64>().ok())
            {
                match projects.iter().find(|p| p.id == id) {
                    Some(p) => {
                        let seen = details.fetch_add(1, Ordering::SeqCst);
                        json_response(200, p.to_json(seen < p.running_polls))
                    }
                    None => json_response(404, json!({"detail": "Not found."})),
                }
            } else {
                json_response(404, json!({"detail": "Not found."}))
            };
            let _ = request.respond(response);
        }
    });

    MockApi {
        base,
        detail_requests,
        last_authorization,
    }
}

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub projects: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        let projects = tmp.path().join("projects");
        fs::create_dir_all(&home).expect("create isolated home");
        fs::create_dir_all(&projects).expect("create projects root");
        Self {
            _tmp: tmp,
            home,
            projects,
        }
    }

    /// Writes `rel` inside the checkout at `local_path`, creating directories.
    pub fn write(&self, local_path: &str, rel: &str, contents: &str) -> PathBuf {
        let path = self.projects.join(local_path).join(rel);
        fs::create_dir_all(path.parent().expect("file parent")).expect("create checkout dirs");
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    pub fn cmd(&self, api: &MockApi) -> Command {
        let mut cmd = cargo_bin_cmd!("scm-inventory");
        for var in SCRUBBED_ENV {
            cmd.env_remove(var);
        }
        cmd.env("HOME", &self.home)
            .env("TOWER_HOST", &api.base)
            .env("PROJECTS_BASE_PATH", &self.projects)
            .env("UPDATE_WAIT_INTERVAL_MS", "10");
        cmd
    }

    pub fn list_json(&self, api: &MockApi, project: &str, inventory: &str) -> Value {
        let out = self
            .cmd(api)
            .env("PROJECT_NAME", project)
            .env("INVENTORY_FILE", inventory)
            .arg("--list")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join(".config/scm-inventory/config.toml")
    }

    pub fn write_config(&self, contents: &str) {
        let path = self.config_path();
        fs::create_dir_all(path.parent().expect("config parent")).expect("create config dir");
        fs::write(path, contents).expect("write config");
    }
}

/// Demo checkout used by most flows: ranges, children, inline vars and
/// variable files.
pub fn write_demo_inventory(env: &TestEnv, local_path: &str) {
    env.write(
        local_path,
        "inventory",
        r#"bastion.example.com

[web]
web[01:02].example.com http_port=80
shared.example.com role=web

[db]
db.example.com:5432 ansible_user=postgres
shared.example.com role=db backup=True

[web:vars]
ntp_server=ntp.example.com

[prod:children]
web
db
"#,
    );
    env.write(local_path, "group_vars/db.yml", "max_connections: 200\n");
    env.write(local_path, "host_vars/web01.example.com.yml", "http_port: 8080\n");
}

pub fn assert_hostvars_cover_groups(doc: &Value) {
    let hostvars = doc["_meta"]["hostvars"]
        .as_object()
        .expect("hostvars object");
    for (name, group) in doc.as_object().expect("document object") {
        if name == "_meta" {
            continue;
        }
        for host in group["hosts"].as_array().expect("hosts array") {
            let host = host.as_str().expect("host name");
            assert!(
                hostvars.contains_key(host),
                "host {host} of group {name} has no hostvars"
            );
        }
    }
}
