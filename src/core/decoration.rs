use crate::client::Client;
use crate::registry::Registry;

use winsys::connection::Connection;
use winsys::geometry::Dim;
use winsys::geometry::Pos;
use winsys::geometry::Region;
use winsys::trap::ErrorTrap;
use winsys::window::Window;

/// Border and drop shadow around managed clients.
pub struct Decoration {}

impl Decoration {
    /// The border region for a client occupying `region` with an X border of `border_width`.
    pub fn frame_region(
        region: Region,
        border_width: u32,
    ) -> Region {
        let extra = 2 * Self::INSET + 2 * border_width as i32;

        region.with_dim(Dim {
            w: region.dim.w + extra,
            h: region.dim.h + extra,
        })
    }

    /// Wraps a registered client in a border (and a shadow, unless `with_shadow` is unset).
    ///
    /// When the client is already mapped, reparenting it makes the server emit an
    /// unmap and a map; on success both are marked as expected on the record.
    pub fn decorate(
        conn: &dyn Connection,
        registry: &mut Registry,
        window: Window,
        with_shadow: bool,
        already_mapped: bool,
    ) {
        let trap = ErrorTrap::new(conn);

        conn.init_client(window);

        if conn
            .get_motif_hints(window)
            .map_or(false, |hints| !hints.wants_border())
        {
            debug!("window {:#0x} requested no border", window);
            trap.release();
            return;
        }

        let region = match conn.get_window_geometry(window) {
            Ok(region) => region,
            Err(_) => {
                trap.release();
                return;
            },
        };

        let frame = Self::frame_region(region, conn.get_window_border_width(window));

        let shadow = if with_shadow {
            conn.create_border(frame.offset(Self::SHADOW_OFFSET)).ok()
        } else {
            None
        };

        let decoration = match conn.create_border(frame) {
            Ok(decoration) => decoration,
            Err(err) => {
                warn!("unable to create border for window {:#0x}: {}", window, err);

                if let Some(shadow) = shadow {
                    conn.destroy_window(shadow);
                }

                trap.release();
                return;
            },
        };

        conn.init_border(decoration);

        if let Some(shadow) = shadow {
            conn.map_window(shadow);
        }

        conn.map_window(decoration);
        conn.sync();
        trap.release();

        registry.attach_decoration(window, decoration, shadow);

        let trap = ErrorTrap::new(conn);
        conn.reparent_window(window, decoration, Pos {
            x: Self::INSET,
            y: Self::INSET,
        });
        conn.sync();

        if trap.release() {
            debug!("window {:#0x} vanished while being reparented", window);
            return;
        }

        if already_mapped {
            if let Some(client) = registry.get(window) {
                client.expect_unmap();
                client.expect_map();
            }
        }
    }

    pub fn undecorate(
        conn: &dyn Connection,
        client: &Client,
    ) {
        let trap = ErrorTrap::new(conn);

        if let Some(decoration) = client.decoration() {
            conn.destroy_window(decoration);
            client.set_decoration(None);
        }

        if let Some(shadow) = client.shadow() {
            conn.destroy_window(shadow);
            client.set_shadow(None);
        }

        trap.release();
    }

    /// Moves the shadow back under its border after the border moved or resized.
    pub fn follow_shadow(
        conn: &dyn Connection,
        client: &Client,
    ) {
        let (decoration, shadow) = match (client.decoration(), client.shadow()) {
            (Some(decoration), Some(shadow)) => (decoration, shadow),
            _ => return,
        };

        let trap = ErrorTrap::new(conn);

        if let Ok(region) = conn.get_window_geometry(decoration) {
            conn.place_window(shadow, &region.offset(Self::SHADOW_OFFSET));
        }

        trap.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::Call;
    use crate::fake::FakeConnection;

    use winsys::hints::MotifHints;

    fn setup(conn: &FakeConnection) -> (Registry, Window) {
        let window = conn.add_window(Region::new(300, 275, 400, 300));
        let mut registry = Registry::new();

        registry.insert(Client::new(window, false));
        (registry, window)
    }

    #[test]
    fn successful_reparent_arms_one_map_and_unmap() {
        let conn = FakeConnection::new(1000, 800);
        let (mut registry, window) = setup(&conn);
        conn.map(window);

        Decoration::decorate(&conn, &mut registry, window, true, true);

        let client = registry.get(window).unwrap();
        let decoration = client.decoration().unwrap();

        assert_eq!(conn.parent_of(window), Some(decoration));
        assert_eq!(conn.geometry_of(decoration), Some(Region::new(300, 275, 402, 302)));
        assert_eq!(conn.geometry_of(client.shadow().unwrap()), Some(Region::new(305, 280, 402, 302)));

        assert!(client.consume_map_if_expecting());
        assert!(!client.consume_map_if_expecting());
        assert!(client.consume_unmap_if_expecting());
        assert!(!client.consume_unmap_if_expecting());
    }

    #[test]
    fn failed_reparent_arms_nothing() {
        let conn = FakeConnection::new(1000, 800);
        let (mut registry, window) = setup(&conn);
        conn.map(window);
        conn.fail_reparent(true);

        Decoration::decorate(&conn, &mut registry, window, true, true);

        let client = registry.get(window).unwrap();
        assert!(client.decoration().is_some());
        assert!(!client.is_expecting_map());
        assert!(!client.is_expecting_unmap());
    }

    #[test]
    fn unmapped_client_arms_nothing() {
        let conn = FakeConnection::new(1000, 800);
        let (mut registry, window) = setup(&conn);

        Decoration::decorate(&conn, &mut registry, window, true, false);

        let client = registry.get(window).unwrap();
        assert!(client.decoration().is_some());
        assert!(!client.is_expecting_map());
        assert!(!client.is_expecting_unmap());
    }

    #[test]
    fn no_shadow_when_not_requested() {
        let conn = FakeConnection::new(1000, 800);
        let (mut registry, window) = setup(&conn);

        Decoration::decorate(&conn, &mut registry, window, false, false);

        let client = registry.get(window).unwrap();
        assert!(client.decoration().is_some());
        assert!(client.shadow().is_none());
    }

    #[test]
    fn motif_no_border_skips_decoration() {
        let conn = FakeConnection::new(1000, 800);
        let (mut registry, window) = setup(&conn);
        conn.set_motif_hints(window, MotifHints::from_raw(&[2, 0, 0]).unwrap());

        Decoration::decorate(&conn, &mut registry, window, true, false);

        assert!(registry.get(window).unwrap().decoration().is_none());
        assert!(conn.calls().contains(&Call::InitClient(window)));
    }

    #[test]
    fn undecorate_destroys_border_and_shadow() {
        let conn = FakeConnection::new(1000, 800);
        let (mut registry, window) = setup(&conn);
        Decoration::decorate(&conn, &mut registry, window, true, false);

        let client = registry.remove(window).unwrap();
        let (decoration, shadow) = (client.decoration().unwrap(), client.shadow().unwrap());

        Decoration::undecorate(&conn, &client);

        assert!(!conn.exists(decoration));
        assert!(!conn.exists(shadow));
        assert!(conn.exists(window));
    }

    #[test]
    fn shadow_follows_border() {
        let conn = FakeConnection::new(1000, 800);
        let (mut registry, window) = setup(&conn);
        Decoration::decorate(&conn, &mut registry, window, true, false);

        let client = registry.get(window).unwrap();
        conn.place_window(client.decoration().unwrap(), &Region::new(10, 20, 100, 50));
        Decoration::follow_shadow(&conn, client);

        assert_eq!(conn.geometry_of(client.shadow().unwrap()), Some(Region::new(15, 25, 100, 50)));
    }
}
