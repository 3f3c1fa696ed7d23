//! Form based HTTP authentication engine.
//!
//! One [`Form`] exists per target. It owns the target configuration and the
//! transport, and tests credentials one after the other: every attempt opens
//! a new connection, sends the login request, follows redirects (replaying
//! the same credentials) and finally looks for the deny signal in the
//! response body.
use crate::creds::Credentials;

pub(crate) mod config;
pub(crate) mod cookies;
mod error;
pub(crate) mod header;
pub(crate) mod machine;
pub(crate) mod options;
pub(crate) mod path;
pub(crate) mod request;
pub(crate) mod status;
pub(crate) mod target;
pub(crate) mod transport;

pub(crate) use config::{FormConfig, FormMethod};
pub(crate) use error::Error;
pub(crate) use machine::Verdict;
pub(crate) use target::Target;
pub(crate) use transport::{TcpTransport, Transport};

use machine::{Event, State};
use status::Status;

const LOCATION: &str = "Location:";

enum Step {
    Redirected,
    Judged(Verdict),
}

pub(crate) struct Form<T: Transport> {
    options: options::Options,
    target: Target,
    config: FormConfig,
    initialized: bool,
    transport: T,
}

impl<T: Transport> Form<T> {
    pub fn new(options: &options::Options, target: Target, transport: T) -> Self {
        Self {
            options: options.resolved(),
            target,
            config: FormConfig::default(),
            initialized: false,
            transport,
        }
    }

    #[cfg(test)]
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    fn initialize(&mut self) {
        self.config = FormConfig::initialize(&self.options, &self.target);
        self.initialized = true;

        log::debug!("[{}] form configuration: {:?}", &self.target, &self.config);
    }

    /// Test a single set of credentials, an error means the verdict is unknown.
    pub async fn attempt(&mut self, creds: &Credentials) -> Result<Verdict, Error> {
        let mut state = if self.initialized {
            State::New
        } else {
            State::Initialize
        };
        let mut outcome = None;
        let mut redirects = 0;

        loop {
            let event = match state {
                State::Initialize => {
                    self.initialize();
                    Event::Configured
                }
                State::New => match self.transport.connect().await {
                    Ok(()) => Event::Connected,
                    Err(e) => {
                        outcome = Some(Err(e));
                        Event::Failed
                    }
                },
                State::Running => match self.step(creds).await {
                    Ok(Step::Redirected) => {
                        redirects += 1;
                        if redirects > self.options.form_max_redirects {
                            outcome = Some(Err(Error::TooManyRedirects(
                                self.options.form_max_redirects,
                            )));
                            Event::Failed
                        } else {
                            Event::Redirected
                        }
                    }
                    Ok(Step::Judged(verdict)) => {
                        outcome = Some(Ok(verdict));
                        Event::Judged
                    }
                    Err(e) => {
                        outcome = Some(Err(e));
                        Event::Failed
                    }
                },
                State::Exiting => {
                    self.transport.disconnect().await;
                    Event::Closed
                }
                State::Complete => break,
            };

            let next = machine::transition(state, event);
            if next == State::Exiting && outcome.is_none() {
                outcome = Some(Err(Error::UnexpectedState {
                    state: format!("{:?}", state),
                    event: format!("{:?}", event),
                }));
            }
            state = next;
        }

        let outcome = outcome.unwrap_or(Err(Error::NoData));
        if outcome.is_err() {
            self.config.abort();
        }
        outcome
    }

    async fn step(&mut self, creds: &Credentials) -> Result<Step, Error> {
        let request = request::build_request(&self.config, creds)?;

        log::debug!(
            "[{}] sending web form authentication ({}) to {}",
            &self.target,
            self.config.method,
            &self.config.resource_path
        );

        self.transport.send(request.as_bytes()).await?;

        let line = self.transport.receive_line().await?.ok_or(Error::NoData)?;
        let status = status::parse_status(&line)
            .ok_or_else(|| Error::StatusParse(line.trim_end().to_owned()))?;

        log::debug!("[{}] http response code was {}", &self.target, status);

        match status {
            Status::Ok => {
                self.config.settle();
                let denied = self.find_deny_signal(line).await?;
                Ok(Step::Judged(if denied {
                    Verdict::Fail
                } else {
                    Verdict::Success
                }))
            }
            status if status.is_redirect() => {
                let response = self.read_headers(line).await?;
                self.follow_redirect(status, &response)?;
                Ok(Step::Redirected)
            }
            status => Err(Error::UnsupportedStatus(status.code())),
        }
    }

    /// Collect the status line and every header up to the blank line.
    async fn read_headers(&mut self, status_line: String) -> Result<String, Error> {
        let mut response = status_line;
        while let Some(line) = self.transport.receive_line().await? {
            let blank = line.trim_end_matches(['\r', '\n']).is_empty();
            response.push_str(&line);
            if blank {
                break;
            }
        }
        Ok(response)
    }

    fn follow_redirect(&mut self, status: Status, response: &str) -> Result<(), Error> {
        log::debug!("[{}] following redirect", &self.target);

        let (location, _) = header::find_header_value(LOCATION, response, 0)
            .ok_or(Error::MissingLocationHeader)?;

        path::resolve_redirect(location, &mut self.config)?;
        self.config.cookie_jar.ingest(response);

        if self.config.method == FormMethod::Post && status.allows_method_change() {
            self.config.downgrade_method();
        }

        Ok(())
    }

    /// Scan the rest of the response, status line included, for the deny signal.
    async fn find_deny_signal(&mut self, first_line: String) -> Result<bool, Error> {
        let mut line = Some(first_line);
        while let Some(current) = line {
            if header::find_ignore_case(&current, &self.config.deny_signal).is_some() {
                log::debug!("[{}] deny signal found", &self.target);
                return Ok(true);
            }
            line = self.transport.receive_line().await?;
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::status::Status;
    use super::transport::mock::MockTransport;
    use super::{options, Error, Form, FormMethod, Target, Verdict};
    use crate::creds::Credentials;

    const DENIED: &str = "HTTP/1.1 200 OK\r\n\
                          Content-Type: text/html\r\n\
                          \r\n\
                          <html>\r\n\
                          <p>LOGIN INCORRECT</p>\r\n\
                          </html>\r\n";

    const WELCOME: &str = "HTTP/1.1 200 OK\r\n\
                           Content-Type: text/html\r\n\
                           \r\n\
                           <html>Welcome back!</html>\r\n";

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }

    fn form(opts: options::Options, responses: &[&str]) -> Form<MockTransport> {
        let target = Target::parse("127.0.0.1:8080", false, None).unwrap();
        Form::new(&opts, target, MockTransport::with_responses(responses))
    }

    fn login_form() -> options::Options {
        options::Options {
            form: Some("/login".to_owned()),
            ..options::Options::default()
        }
    }

    #[tokio::test]
    async fn success_when_deny_signal_is_missing() {
        let mut form = form(login_form(), &[WELCOME]);
        assert_eq!(form.attempt(&creds("admin", "admin")).await, Ok(Verdict::Success));
        assert_eq!(form.transport.connections, 1);
    }

    #[tokio::test]
    async fn fail_when_deny_signal_is_found() {
        let mut form = form(login_form(), &[DENIED]);
        assert_eq!(form.attempt(&creds("admin", "nope")).await, Ok(Verdict::Fail));
    }

    #[tokio::test]
    async fn deny_signal_is_searched_in_status_line_too() {
        let opts = options::Options {
            deny_signal: Some("200 ok".to_owned()),
            ..login_form()
        };
        let mut form = form(opts, &[WELCOME]);
        assert_eq!(form.attempt(&creds("a", "b")).await, Ok(Verdict::Fail));
    }

    #[tokio::test]
    async fn sends_default_post_request() {
        let mut form = form(login_form(), &[WELCOME]);
        form.attempt(&creds("admin", "s3cr3t!")).await.unwrap();

        let body = "username=admin&password=s3cr3t%21";
        assert_eq!(
            form.transport.requests,
            vec![format!(
                "POST /login HTTP/1.0\r\n\
                 Host: 127.0.0.1:8080\r\n\
                 User-Agent: {}\r\n\
                 Content-Type: application/x-www-form-urlencoded\r\n\
                 Content-Length: {}\r\n\
                 \r\n\
                 {}",
                crate::form::config::DEFAULT_USER_AGENT,
                body.len(),
                body
            )]
        );
    }

    #[tokio::test]
    async fn follows_downgrading_redirect_and_restores() {
        let redirect = "HTTP/1.1 302 Found\r\n\
                        Location: /new?x=1\r\n\
                        Set-Cookie: sid=1; Path=/\r\n\
                        \r\n";
        let mut form = form(login_form(), &[redirect, WELCOME, DENIED]);

        assert_eq!(form.attempt(&creds("admin", "pw")).await, Ok(Verdict::Success));
        assert_eq!(form.transport.connections, 2);

        // the bounce request is a bare GET carrying the cookies
        assert!(form.transport.requests[0].starts_with("POST /login HTTP/1.0\r\n"));
        assert_eq!(
            form.transport.requests[1],
            format!(
                "GET /new HTTP/1.0\r\n\
                 Host: 127.0.0.1:8080\r\n\
                 User-Agent: {}\r\n\
                 Cookie: sid=1; Path=/\r\n\
                 \r\n",
                crate::form::config::DEFAULT_USER_AGENT
            )
        );

        // back to the original form for the next credentials
        let config = form.config();
        assert_eq!(config.method, FormMethod::Post);
        assert_eq!(config.resource_path, "/login");
        assert_eq!(config.resource_path_previous, None);
        assert!(config.cookie_jar.is_empty());
        assert!(!config.method_changed);

        assert_eq!(form.attempt(&creds("admin", "pw2")).await, Ok(Verdict::Fail));
        assert!(form.transport.requests[2].starts_with("POST /login HTTP/1.0\r\n"));
        assert!(form.transport.requests[2].ends_with("username=admin&password=pw2"));
    }

    #[test]
    fn redirect_state_before_completion() {
        let redirect = "HTTP/1.1 302 Found\r\nLocation: /new?x=1\r\n\r\n";
        let mut form = form(login_form(), &[]);
        form.initialize();

        form.follow_redirect(Status::Found, redirect).unwrap();

        let config = form.config();
        assert!(config.method_changed);
        assert_eq!(config.method, FormMethod::Get);
        assert_eq!(config.resource_path, "/new");
        assert_eq!(config.resource_path_previous.as_deref(), Some("/login"));
    }

    #[tokio::test]
    async fn failed_redirect_chain_is_rolled_back() {
        let redirect = "HTTP/1.1 302 Found\r\n\
                        Location: /home\r\n\
                        Set-Cookie: sid=1\r\n\
                        \r\n";
        let mut form = form(login_form(), &[redirect, "", DENIED]);

        assert_eq!(form.attempt(&creds("admin", "wrong")).await, Err(Error::NoData));

        let config = form.config();
        assert!(!config.method_changed);
        assert_eq!(config.method, FormMethod::Post);
        assert_eq!(config.resource_path, "/login");
        assert_eq!(config.resource_path_previous, None);
        assert!(config.cookie_jar.is_empty());

        // the retry posts the credentials to the original form again
        assert_eq!(form.attempt(&creds("admin", "wrong")).await, Ok(Verdict::Fail));
        assert!(form.transport.requests[2].starts_with("POST /login HTTP/1.0\r\n"));
        assert!(form.transport.requests[2].ends_with("username=admin&password=wrong"));
        assert!(!form.transport.requests[2].contains("Cookie:"));
    }

    #[tokio::test]
    async fn redirect_loop_failure_is_rolled_back() {
        let opts = options::Options {
            form_max_redirects: 1,
            ..login_form()
        };
        let redirect = "HTTP/1.1 302 Found\r\nLocation: /home\r\n\r\n";
        let mut form = form(opts, &[redirect, redirect]);

        assert_eq!(
            form.attempt(&creds("a", "b")).await,
            Err(Error::TooManyRedirects(1))
        );
        assert_eq!(form.config().method, FormMethod::Post);
        assert_eq!(form.config().resource_path, "/login");
    }

    #[tokio::test]
    async fn temporary_redirect_keeps_method_and_credentials() {
        let redirect = "HTTP/1.1 307 Temporary Redirect\r\nLocation: auth.php\r\n\r\n";
        let mut form = form(login_form(), &[redirect, WELCOME]);

        assert_eq!(form.attempt(&creds("bob", "pw")).await, Ok(Verdict::Success));
        assert!(form.transport.requests[1].starts_with("POST /auth.php HTTP/1.0\r\n"));
        assert!(form.transport.requests[1].ends_with("username=bob&password=pw"));
        assert_eq!(form.config().method, FormMethod::Post);
        assert_eq!(form.config().resource_path, "/auth.php");
    }

    #[tokio::test]
    async fn get_form_is_not_downgraded() {
        let opts = options::Options {
            form_data: Some("get?u=&p=".to_owned()),
            ..login_form()
        };
        let redirect = "HTTP/1.1 301 Moved Permanently\r\nLocation: /v2/login\r\n\r\n";
        let mut form = form(opts, &[redirect, WELCOME]);

        assert_eq!(form.attempt(&creds("bob", "p w")).await, Ok(Verdict::Success));
        assert!(form.transport.requests[1].starts_with("GET /v2/login?u=bob&p=p%20w HTTP/1.0\r\n"));
        assert!(!form.config().method_changed);
    }

    #[tokio::test]
    async fn missing_location_is_unknown() {
        let mut form = form(login_form(), &["HTTP/1.1 302 Found\r\n\r\n"]);
        let result = form.attempt(&creds("a", "b")).await;
        assert_eq!(result, Err(Error::MissingLocationHeader));
        assert_eq!(Verdict::from(&result), Verdict::Unknown);
    }

    #[tokio::test]
    async fn client_errors_are_unknown_regardless_of_body() {
        for code in [400, 401, 403, 404] {
            let response = format!("HTTP/1.1 {} Nope\r\n\r\nLogin incorrect\r\n", code);
            let mut form = form(login_form(), &[&response]);
            assert_eq!(
                form.attempt(&creds("a", "b")).await,
                Err(Error::UnsupportedStatus(code))
            );
        }
    }

    #[tokio::test]
    async fn unimplemented_status_is_unknown() {
        let mut form = form(login_form(), &["HTTP/1.1 500 Oops\r\n\r\n"]);
        assert_eq!(
            form.attempt(&creds("a", "b")).await,
            Err(Error::UnsupportedStatus(500))
        );
    }

    #[tokio::test]
    async fn garbage_status_is_unknown() {
        let mut form = form(login_form(), &["garbage\r\n"]);
        assert_eq!(
            form.attempt(&creds("a", "b")).await,
            Err(Error::StatusParse("garbage".to_owned()))
        );
    }

    #[tokio::test]
    async fn empty_response_is_unknown() {
        let mut form = form(login_form(), &[""]);
        assert_eq!(form.attempt(&creds("a", "b")).await, Err(Error::NoData));
    }

    #[tokio::test]
    async fn connection_failure_is_unknown() {
        let mut form = form(login_form(), &[]);
        form.transport.refuse = true;
        assert!(matches!(
            form.attempt(&creds("a", "b")).await,
            Err(Error::ConnectionFailed { .. })
        ));
    }

    #[tokio::test]
    async fn redirect_loops_are_bounded() {
        let opts = options::Options {
            form_max_redirects: 3,
            ..login_form()
        };
        let redirect = "HTTP/1.1 307 Temporary Redirect\r\nLocation: /login\r\n\r\n";
        let mut form = form(opts, &[redirect; 10]);

        assert_eq!(
            form.attempt(&creds("a", "b")).await,
            Err(Error::TooManyRedirects(3))
        );
        assert_eq!(form.transport.connections, 4);
    }

    #[tokio::test]
    async fn unresolvable_redirect_is_unknown() {
        let mut form = form(login_form(), &["HTTP/1.1 302 Found\r\nLocation: ?a=b\r\n\r\n"]);
        assert_eq!(
            form.attempt(&creds("a", "b")).await,
            Err(Error::UnresolvableRedirect(String::new()))
        );
        assert_eq!(form.config().resource_path, "/login");
    }

    #[tokio::test]
    async fn configuration_is_initialized_once() {
        let mut form = form(login_form(), &[WELCOME, WELCOME]);
        form.attempt(&creds("a", "b")).await.unwrap();

        form.config.user_agent = "changed".to_owned();
        form.attempt(&creds("a", "c")).await.unwrap();

        assert!(form.transport.requests[1].contains("User-Agent: changed\r\n"));
    }
}
