//! 单线程会话 Actor
//!
//! 多线程宿主通过消息把操作发送到持有会话的线程，
//! 所有修改都在这一个线程上按顺序执行。

use crossbeam::channel::{self, Receiver, Sender};
use meshmark_core::geometry::Annotation;
use meshmark_core::math::BoundingBox3;
use meshmark_core::model::ModelEntry;
use meshmark_core::store::AnnotationSet;
use meshmark_core::AnnotationError;
use std::thread::{self, JoinHandle};
use thiserror::Error;

use crate::event::{EventOutcome, PointerEvent};
use crate::session::AnnotationSession;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActorError {
    #[error("Session thread is no longer running")]
    Disconnected,

    #[error("Session thread panicked")]
    Panicked,

    #[error(transparent)]
    Annotation(#[from] AnnotationError),
}

/// 发送给会话线程的消息
enum SessionCommand {
    Event {
        event: PointerEvent,
        reply: Sender<Result<EventOutcome, AnnotationError>>,
    },
    ConfirmDelete {
        reply: Sender<Option<Annotation>>,
    },
    SwitchModel {
        model: ModelEntry,
        bounds: Option<BoundingBox3>,
        reply: Sender<()>,
    },
    Import {
        annotations: AnnotationSet,
        reply: Sender<Result<(), AnnotationError>>,
    },
    Snapshot {
        reply: Sender<AnnotationSet>,
    },
    Shutdown,
}

pub struct SessionActor;

impl SessionActor {
    /// 把会话移动到新线程上
    pub fn spawn(session: AnnotationSession) -> std::io::Result<SessionHandle> {
        let (sender, receiver) = channel::unbounded();
        let thread = thread::Builder::new()
            .name("annotation-session".to_string())
            .spawn(move || Self::run(session, receiver))?;

        Ok(SessionHandle {
            sender,
            thread: Some(thread),
        })
    }

    fn run(
        mut session: AnnotationSession,
        receiver: Receiver<SessionCommand>,
    ) -> AnnotationSession {
        tracing::debug!("Session thread started");

        // 回复失败说明请求方已放弃等待，忽略即可
        for command in receiver.iter() {
            match command {
                SessionCommand::Event { event, reply } => {
                    let _ = reply.send(session.handle(event));
                }
                SessionCommand::ConfirmDelete { reply } => {
                    let _ = reply.send(session.confirm_delete());
                }
                SessionCommand::SwitchModel {
                    model,
                    bounds,
                    reply,
                } => {
                    session.switch_model(model, bounds);
                    let _ = reply.send(());
                }
                SessionCommand::Import { annotations, reply } => {
                    let _ = reply.send(session.import(annotations));
                }
                SessionCommand::Snapshot { reply } => {
                    let _ = reply.send(session.annotations().clone());
                }
                SessionCommand::Shutdown => break,
            }
        }

        tracing::debug!("Session thread stopped");
        session
    }
}

/// 会话线程句柄
pub struct SessionHandle {
    sender: Sender<SessionCommand>,
    thread: Option<JoinHandle<AnnotationSession>>,
}

impl SessionHandle {
    fn request<T>(&self, make: impl FnOnce(Sender<T>) -> SessionCommand) -> Result<T, ActorError> {
        let (reply, response) = channel::bounded(1);
        self.sender
            .send(make(reply))
            .map_err(|_| ActorError::Disconnected)?;
        response.recv().map_err(|_| ActorError::Disconnected)
    }

    pub fn handle(&self, event: PointerEvent) -> Result<EventOutcome, ActorError> {
        Ok(self.request(|reply| SessionCommand::Event { event, reply })??)
    }

    pub fn confirm_delete(&self) -> Result<Option<Annotation>, ActorError> {
        self.request(|reply| SessionCommand::ConfirmDelete { reply })
    }

    pub fn switch_model(
        &self,
        model: ModelEntry,
        bounds: Option<BoundingBox3>,
    ) -> Result<(), ActorError> {
        self.request(|reply| SessionCommand::SwitchModel {
            model,
            bounds,
            reply,
        })
    }

    /// 替换会话中的标注集合，ID 超出范围时会话保持不变
    pub fn import(&self, annotations: AnnotationSet) -> Result<(), ActorError> {
        Ok(self.request(|reply| SessionCommand::Import { annotations, reply })??)
    }

    /// 当前标注集合的副本
    pub fn snapshot(&self) -> Result<AnnotationSet, ActorError> {
        self.request(|reply| SessionCommand::Snapshot { reply })
    }

    /// 停止会话线程并取回会话
    pub fn shutdown(mut self) -> Result<AnnotationSession, ActorError> {
        let _ = self.sender.send(SessionCommand::Shutdown);
        let thread = self.thread.take().ok_or(ActorError::Disconnected)?;
        thread.join().map_err(|_| ActorError::Panicked)
    }
}
