//! Access-control factories: credentials, permissions, user groups and proxies.

use std::sync::Arc;

use crate::descriptor::{ObjectKind, TypeDescriptor};
use crate::graph::Graph;
use crate::node::Node;
use crate::resolver::Resolver;
use crate::vocab;

use super::{FactoryDescriptor, FactoryError, FactoryResult, ObjectFactory, invalid_configuration};

/// A user name and password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// A set of actions, `*` matching any action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    actions: Vec<String>,
}

impl Permission {
    pub fn new(actions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Whether this permission covers `action` (case-insensitive).
    pub fn covers(&self, action: &str) -> bool {
        self.actions
            .iter()
            .any(|a| a == "*" || a.eq_ignore_ascii_case(action))
    }
}

/// A group of users with allow/deny permissions.
///
/// Deny wins over allow; actions covered by neither are refused.
#[derive(Debug, Clone)]
pub struct UserGroup {
    members: Vec<Arc<Credentials>>,
    requires_authentication: bool,
    allowed: Vec<Arc<Permission>>,
    denied: Vec<Arc<Permission>>,
}

impl UserGroup {
    pub fn members(&self) -> &[Arc<Credentials>] {
        &self.members
    }

    pub fn requires_authentication(&self) -> bool {
        self.requires_authentication
    }

    pub fn has_member(&self, user: &str) -> bool {
        self.members.iter().any(|m| m.user == user)
    }

    /// Whether `user` with `password` is a member of this group.
    pub fn authenticates(&self, user: &str, password: &str) -> bool {
        self.members
            .iter()
            .any(|m| m.user == user && m.password == password)
    }

    pub fn permits(&self, action: &str) -> bool {
        if self.denied.iter().any(|p| p.covers(action)) {
            return false;
        }
        self.allowed.iter().any(|p| p.covers(action))
    }
}

/// An HTTP proxy server with optional credentials.
#[derive(Debug, Clone)]
pub struct Proxy {
    pub server: String,
    pub credentials: Option<Credentials>,
}

/// Builds [`UserGroup`]s from `cfg:member`, `cfg:requiresAuthentication`,
/// `cfg:allow` and `cfg:deny`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserGroupFactory;

impl ObjectFactory for UserGroupFactory {
    fn descriptor(&self) -> FactoryDescriptor {
        FactoryDescriptor::of::<Self>()
    }

    fn can_produce(&self, target: &TypeDescriptor) -> bool {
        target.is(ObjectKind::UserGroup)
    }

    fn try_produce(
        &self,
        resolver: &mut Resolver,
        graph: &Graph,
        node: &Node,
        _target: &TypeDescriptor,
    ) -> FactoryResult {
        let values = resolver.values(graph);
        let credentials = TypeDescriptor::of_kind(ObjectKind::Credentials);
        let permission = TypeDescriptor::of_kind(ObjectKind::Permission);

        let mut members = Vec::new();
        for member in values.all(node, vocab::PROP_MEMBER) {
            resolver.check_direct_reference(node, &member, vocab::PROP_MEMBER)?;
            members.push(resolver.resolve_as::<Credentials>(graph, &member, &credentials)?);
        }

        let mut permissions = |property: &str| -> Result<Vec<Arc<Permission>>, FactoryError> {
            let mut out = Vec::new();
            for p in values.all(node, property) {
                resolver.check_direct_reference(node, &p, property)?;
                out.push(resolver.resolve_as::<Permission>(graph, &p, &permission)?);
            }
            Ok(out)
        };
        let allowed = permissions(vocab::PROP_ALLOW)?;
        let denied = permissions(vocab::PROP_DENY)?;

        Ok(Some(Arc::new(UserGroup {
            members,
            requires_authentication: values.bool(node, vocab::PROP_REQUIRES_AUTHENTICATION, true),
            allowed,
            denied,
        })))
    }
}

/// Builds [`Permission`]s from `cfg:action` literals. A node without actions
/// is not a permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionFactory;

impl ObjectFactory for PermissionFactory {
    fn descriptor(&self) -> FactoryDescriptor {
        FactoryDescriptor::of::<Self>()
    }

    fn can_produce(&self, target: &TypeDescriptor) -> bool {
        target.is(ObjectKind::Permission)
    }

    fn try_produce(
        &self,
        resolver: &mut Resolver,
        graph: &Graph,
        node: &Node,
        _target: &TypeDescriptor,
    ) -> FactoryResult {
        let actions = resolver.values(graph).literals(node, vocab::PROP_ACTION);
        if actions.is_empty() {
            return Ok(None);
        }
        Ok(Some(Arc::new(Permission::new(actions))))
    }
}

/// Builds [`Credentials`] from `cfg:user` and `cfg:password`. Both are required.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialsFactory;

impl ObjectFactory for CredentialsFactory {
    fn descriptor(&self) -> FactoryDescriptor {
        FactoryDescriptor::of::<Self>()
    }

    fn can_produce(&self, target: &TypeDescriptor) -> bool {
        target.is(ObjectKind::Credentials)
    }

    fn try_produce(
        &self,
        resolver: &mut Resolver,
        graph: &Graph,
        node: &Node,
        _target: &TypeDescriptor,
    ) -> FactoryResult {
        match resolver.user_and_password(graph, node, false)? {
            (Some(user), Some(password)) => Ok(Some(Arc::new(Credentials { user, password }))),
            _ => Ok(None),
        }
    }
}

/// Builds [`Proxy`] settings from `cfg:server`.
///
/// Credentials come from `cfg:user`/`cfg:password` or a `cfg:credentials`
/// object, unless `cfg:useCredentialsForProxy` is false.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxyFactory;

impl ObjectFactory for ProxyFactory {
    fn descriptor(&self) -> FactoryDescriptor {
        FactoryDescriptor::of::<Self>()
    }

    fn can_produce(&self, target: &TypeDescriptor) -> bool {
        target.is(ObjectKind::Proxy)
    }

    fn try_produce(
        &self,
        resolver: &mut Resolver,
        graph: &Graph,
        node: &Node,
        _target: &TypeDescriptor,
    ) -> FactoryResult {
        let values = resolver.values(graph);
        let Some(server) = values.value(node, vocab::PROP_SERVER) else {
            return Ok(None);
        };
        if server.trim().is_empty() {
            return Err(invalid_configuration(node, "cfg:server is empty"));
        }

        let credentials = if values.bool(node, vocab::PROP_USE_CREDENTIALS_FOR_PROXY, true) {
            match resolver.user_and_password(graph, node, true)? {
                (Some(user), Some(password)) => Some(Credentials { user, password }),
                _ => None,
            }
        } else {
            None
        };

        Ok(Some(Arc::new(Proxy {
            server,
            credentials,
        })))
    }
}
