use std::sync::Arc;
use std::time;

use rand::Rng;
use tokio::task;

use super::{Error, Loot, Session};
use crate::creds::{Combinator, Credentials};
use crate::form::{self, Form, Target, TcpTransport, Transport, Verdict};

pub(crate) async fn run(session: Arc<Session>) -> Result<(), Error> {
    // spawn worker tasks
    let mut workers = vec![];
    for _ in 0..session.options.concurrency.max(1) {
        workers.push(task::spawn(worker(session.clone())));
    }

    // feed the targets to the workers
    for target in &session.targets {
        if session.is_stop() {
            log::debug!("exiting loop");
            break;
        } else if let Err(e) = session.runtime.send_target(target.clone()).await {
            log::error!("{}", e);
        }
    }

    session.runtime.close();

    for handle in workers {
        handle.await.map_err(|e| e.to_string())?;
    }

    Ok(())
}

async fn worker(session: Arc<Session>) {
    log::debug!("worker started");

    while let Ok(raw) = session.runtime.recv_target().await {
        if session.is_stop() {
            log::debug!("exiting worker");
            break;
        }

        if let Err(e) = test_target(&session, &raw).await {
            log::error!("[{}] {}", &raw, e);
        }
    }

    log::debug!("worker exit");
}

async fn test_target(session: &Session, raw: &str) -> Result<(), Error> {
    let target = Target::parse(raw, session.options.ssl, session.options.port)?;
    let timeout = time::Duration::from_millis(session.options.timeout);
    let transport = TcpTransport::new(&target, timeout);
    let mut form = Form::new(&session.options.form, target, transport);

    test_credentials(session, raw, &mut form).await
}

/// Run the whole credentials search space against one form.
async fn test_credentials<T: Transport>(
    session: &Session,
    target: &str,
    form: &mut Form<T>,
) -> Result<(), Error> {
    let combinator = Combinator::from_options(&session.options)?;
    let retry_time = time::Duration::from_millis(session.options.retry_time);
    let retries = session.options.retries.max(1);

    for creds in combinator {
        if session.is_stop() {
            break;
        }

        let mut attempt = 0;
        let result = loop {
            // perform random jitter if needed
            if session.options.jitter_max > 0 {
                let ms = rand::rng()
                    .random_range(session.options.jitter_min..=session.options.jitter_max);
                if ms > 0 {
                    log::debug!("jitter of {} ms", ms);
                    tokio::time::sleep(time::Duration::from_millis(ms)).await;
                }
            }

            attempt += 1;

            match form.attempt(&creds).await {
                Err(err) if attempt < retries && !session.is_stop() => {
                    log::debug!("[{}] attempt {}/{}: {}", target, attempt, retries, err);
                    tokio::time::sleep(retry_time).await;
                }
                result => break result,
            }
        };

        session.inc_done();

        log::debug!(
            "[{}] {}:{} -> {}",
            target,
            &creds.username,
            &creds.password,
            Verdict::from(&result)
        );

        match result {
            Ok(Verdict::Success) => session.add_loot(loot(target, &creds))?,
            Ok(_) => {}
            Err(err) => {
                session.inc_errors();
                log::error!("[{}] attempt {}/{}: {}", target, attempt, retries, err);

                // no point in going on with a host we can't talk to
                if matches!(err, form::Error::ConnectionFailed { .. }) {
                    return Err("target unreachable, skipping".to_owned());
                }
            }
        }
    }

    Ok(())
}

fn loot(target: &str, creds: &Credentials) -> Loot {
    Loot::new(
        target,
        [
            ("username".to_owned(), creds.username.clone()),
            ("password".to_owned(), creds.password.clone()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::{run, test_credentials};
    use crate::form::transport::mock::MockTransport;
    use crate::form::{Form, Target};
    use crate::session::Session;
    use crate::Options;

    fn options(target: &str) -> Options {
        let mut opts = Options {
            target: Some(target.to_owned()),
            username: Some("admin".to_owned()),
            password: Some("secret".to_owned()),
            timeout: 2000,
            retries: 2,
            retry_time: 0,
            concurrency: 1,
            ..Options::default()
        };
        opts.form.form = Some("/login".to_owned());
        opts
    }

    const DENIED: &str = "HTTP/1.1 200 OK\r\n\r\n<p>Login incorrect</p>\r\n";
    const GRANTED: &str = "HTTP/1.1 200 OK\r\n\r\n<p>Welcome</p>\r\n";

    #[tokio::test]
    async fn success_is_looted() {
        let session = Session::new(options("127.0.0.1:8080")).unwrap();
        let target = Target::parse("127.0.0.1:8080", false, None).unwrap();
        let mut form = Form::new(
            &session.options.form,
            target,
            MockTransport::with_responses(&[GRANTED]),
        );

        test_credentials(&session, "127.0.0.1:8080", &mut form)
            .await
            .unwrap();

        let results = session.get_results();
        assert_eq!(results.len(), 1);
        assert_eq!(session.get_done(), 1);
        assert_eq!(session.get_errors(), 0);
    }

    #[tokio::test]
    async fn failure_is_not_looted() {
        let session = Session::new(options("127.0.0.1:8080")).unwrap();
        let target = Target::parse("127.0.0.1:8080", false, None).unwrap();
        let mut form = Form::new(
            &session.options.form,
            target,
            MockTransport::with_responses(&[DENIED]),
        );

        test_credentials(&session, "127.0.0.1:8080", &mut form)
            .await
            .unwrap();

        assert!(session.get_results().is_empty());
        assert_eq!(session.get_done(), 1);
    }

    #[tokio::test]
    async fn inconclusive_attempts_are_retried() {
        let session = Session::new(options("127.0.0.1:8080")).unwrap();
        let target = Target::parse("127.0.0.1:8080", false, None).unwrap();
        let mut form = Form::new(
            &session.options.form,
            target,
            MockTransport::with_responses(&["HTTP/1.1 500 Internal Server Error\r\n\r\n", GRANTED]),
        );

        test_credentials(&session, "127.0.0.1:8080", &mut form)
            .await
            .unwrap();

        assert_eq!(session.get_results().len(), 1);
        assert_eq!(session.get_errors(), 0);
    }

    #[tokio::test]
    async fn exhausted_retries_are_errors() {
        let session = Session::new(options("127.0.0.1:8080")).unwrap();
        let target = Target::parse("127.0.0.1:8080", false, None).unwrap();
        let mut form = Form::new(
            &session.options.form,
            target,
            MockTransport::with_responses(&[
                "HTTP/1.1 404 Not Found\r\n\r\n",
                "HTTP/1.1 404 Not Found\r\n\r\n",
            ]),
        );

        test_credentials(&session, "127.0.0.1:8080", &mut form)
            .await
            .unwrap();

        assert!(session.get_results().is_empty());
        assert_eq!(session.get_errors(), 1);
        assert_eq!(session.get_done(), 1);
    }

    #[tokio::test]
    async fn unreachable_target_is_skipped() {
        let session = Session::new(options("127.0.0.1:8080")).unwrap();
        let target = Target::parse("127.0.0.1:8080", false, None).unwrap();
        let mut transport = MockTransport::with_responses(&[]);
        transport.refuse = true;
        let mut form = Form::new(&session.options.form, target, transport);

        let res = test_credentials(&session, "127.0.0.1:8080", &mut form).await;
        assert!(res.is_err());
        assert_eq!(session.get_errors(), 1);
    }

    #[tokio::test]
    async fn runs_against_live_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let responses = [
                "HTTP/1.0 302 Found\r\nLocation: /home\r\nSet-Cookie: sid=1\r\n\r\n",
                GRANTED,
            ];
            let mut requests = vec![];
            for response in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                let mut buf = vec![0u8; 4096];
                let n = stream.read(&mut buf).await.unwrap();
                requests.push(String::from_utf8_lossy(&buf[..n]).to_string());
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            }
            requests
        });

        let session = Session::new(options(&address.to_string())).unwrap();
        run(session.clone()).await.unwrap();

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /login HTTP/1.0\r\n"));
        assert!(requests[1].starts_with("GET /home HTTP/1.0\r\n"));
        assert!(requests[1].contains("Cookie: sid=1\r\n"));

        assert_eq!(session.get_results().len(), 1);
        assert_eq!(session.get_done(), 1);
    }
}
