//! Platform functions: member lookup, moderation and messaging.
//!
//! Where a member argument is optional it defaults to the invoking user,
//! and a missing channel defaults to the channel the template runs in.

use async_trait::async_trait;
use ccmd_value::Value;

use super::helpers::{arg, render_arg, require_id, text_arg};
use crate::errors::{invalid_argument, FnError, FnResult};
use crate::host::{HostError, Member, MessageContent};
use crate::registry::{Arity, CallContext, EffectingFunction, FunctionRegistry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlatformOp {
    GetMember,
    SetNickname,
    AddRole,
    RemoveRole,
    SendMessage,
    SendDirect,
    HasRole,
    HasPermission,
}

/// One platform function; the op selects which.
struct PlatformCall(PlatformOp);

pub(super) fn register(registry: &mut FunctionRegistry) {
    let table = [
        ("getMember", Arity::Exact(1), PlatformOp::GetMember),
        ("setNickname", Arity::Between(1, 2), PlatformOp::SetNickname),
        ("addRole", Arity::Between(1, 2), PlatformOp::AddRole),
        ("removeRole", Arity::Between(1, 2), PlatformOp::RemoveRole),
        ("sendMessage", Arity::Exact(2), PlatformOp::SendMessage),
        ("sendDM", Arity::Between(1, 2), PlatformOp::SendDirect),
        ("hasRole", Arity::Between(1, 2), PlatformOp::HasRole),
        ("hasPermission", Arity::Between(1, 2), PlatformOp::HasPermission),
    ];
    for (name, arity, op) in table {
        registry.register_effecting(name, arity, PlatformCall(op));
    }
}

/// The member at `args[index]`, or the invoking user when omitted.
fn member_arg(cx: &CallContext<'_>, args: &[Value], index: usize) -> Result<String, FnError> {
    if args.len() > index {
        return require_id(args, index);
    }
    cx.invoker_id()
        .ok_or_else(|| invalid_argument("no member given and no invoking user"))
}

fn channel_arg(cx: &CallContext<'_>, args: &[Value], index: usize) -> Result<String, FnError> {
    match arg(args, index) {
        Value::Null => None,
        Value::Str(s) if s.trim().is_empty() => None,
        _ => Some(require_id(args, index)?),
    }
    .or_else(|| cx.channel_id())
    .ok_or_else(|| invalid_argument("no channel given and no current channel"))
}

/// A map is an embed; anything else is sent as its text.
fn content_arg(args: &[Value], index: usize) -> Result<MessageContent, FnError> {
    match arg(args, index) {
        value @ Value::Map(_) => {
            render_arg(value, index)?;
            Ok(MessageContent::Embed(value.clone()))
        }
        _ => {
            let text = text_arg(args, index)?;
            if text.trim().is_empty() {
                return Err(invalid_argument("cannot send an empty message"));
            }
            Ok(MessageContent::Text(text.into_owned()))
        }
    }
}

#[async_trait]
impl EffectingFunction for PlatformCall {
    async fn call(&self, cx: &CallContext<'_>, args: Vec<Value>) -> FnResult {
        let platform = cx.platform;
        match self.0 {
            PlatformOp::GetMember => {
                let id = require_id(&args, 0)?;
                Ok(platform
                    .resolve_member(&id)
                    .await?
                    .as_ref()
                    .map_or(Value::Null, Member::to_value))
            }
            PlatformOp::SetNickname => {
                let (member, nickname) = if args.len() == 2 {
                    (require_id(&args, 0)?, text_arg(&args, 1)?.into_owned())
                } else {
                    (member_arg(cx, &args, 1)?, text_arg(&args, 0)?.into_owned())
                };
                platform.set_nickname(&member, nickname.trim()).await?;
                Ok(Value::Null)
            }
            PlatformOp::AddRole => {
                let role = require_id(&args, 0)?;
                let member = member_arg(cx, &args, 1)?;
                platform.add_role(&member, &role).await?;
                Ok(Value::Null)
            }
            PlatformOp::RemoveRole => {
                let role = require_id(&args, 0)?;
                let member = member_arg(cx, &args, 1)?;
                platform.remove_role(&member, &role).await?;
                Ok(Value::Null)
            }
            PlatformOp::SendMessage => {
                let channel = channel_arg(cx, &args, 0)?;
                let content = content_arg(&args, 1)?;
                platform.send_message(&channel, content).await?;
                Ok(Value::Null)
            }
            PlatformOp::SendDirect => {
                let (user, content) = if args.len() == 2 {
                    (require_id(&args, 0)?, content_arg(&args, 1)?)
                } else {
                    (member_arg(cx, &args, 1)?, content_arg(&args, 0)?)
                };
                platform.send_direct_message(&user, content).await?;
                Ok(Value::Null)
            }
            PlatformOp::HasRole => {
                let role = require_id(&args, 0)?;
                let member = member_arg(cx, &args, 1)?;
                let found = platform.resolve_member(&member).await?;
                Ok(Value::Bool(found.is_some_and(|m| m.has_role(&role))))
            }
            PlatformOp::HasPermission => {
                let permission = text_arg(&args, 0)?.into_owned();
                let member = member_arg(cx, &args, 1)?;
                let found = platform
                    .resolve_member(&member)
                    .await?
                    .ok_or_else(|| HostError::NotFound(format!("member {member}")))?;
                Ok(Value::Bool(found.has_permission(&permission)))
            }
        }
    }
}
