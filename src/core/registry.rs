use crate::client::Client;

use winsys::window::Window;

use std::collections::HashMap;

/// Managed clients, indexed by client window, decoration, and shadow.
pub struct Registry {
    clients: HashMap<Window, Client>,
    decorations: HashMap<Window, Window>,
    shadows: HashMap<Window, Window>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            clients: HashMap::with_capacity(20),
            decorations: HashMap::with_capacity(20),
            shadows: HashMap::with_capacity(20),
        }
    }

    #[inline]
    pub fn get(
        &self,
        window: Window,
    ) -> Option<&Client> {
        self.clients.get(&window)
    }

    #[inline]
    pub fn contains(
        &self,
        window: Window,
    ) -> bool {
        self.clients.contains_key(&window)
    }

    /// Resolves a client, its decoration, or its shadow to the client record.
    pub fn lookup_any(
        &self,
        window: Window,
    ) -> Option<&Client> {
        self.clients.get(&window).or_else(|| {
            self.decorations
                .get(&window)
                .or_else(|| self.shadows.get(&window))
                .and_then(|client| self.clients.get(client))
        })
    }

    #[inline]
    pub fn is_shadow(
        &self,
        window: Window,
    ) -> bool {
        self.shadows.contains_key(&window)
    }

    /// Inserts a record unless the window is already managed; returns the live record.
    pub fn insert(
        &mut self,
        client: Client,
    ) -> &Client {
        self.clients.entry(client.window()).or_insert(client)
    }

    pub fn attach_decoration(
        &mut self,
        window: Window,
        decoration: Window,
        shadow: Option<Window>,
    ) {
        if let Some(client) = self.clients.get(&window) {
            client.set_decoration(Some(decoration));
            client.set_shadow(shadow);

            self.decorations.insert(decoration, window);
            if let Some(shadow) = shadow {
                self.shadows.insert(shadow, window);
            }
        }
    }

    /// Drops the record of a client window; removing an unknown window is a no-op.
    pub fn remove(
        &mut self,
        window: Window,
    ) -> Option<Client> {
        let client = self.clients.remove(&window)?;

        if let Some(decoration) = client.decoration() {
            self.decorations.remove(&decoration);
        }

        if let Some(shadow) = client.shadow() {
            self.shadows.remove(&shadow);
        }

        Some(client)
    }

    #[inline]
    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    #[inline]
    pub fn windows(&self) -> Vec<Window> {
        self.clients.keys().copied().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
