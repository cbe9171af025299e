#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use lumen_core::*;

    use crate::*;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn text_of(view: &View) -> &str {
        match &view.kind {
            ViewKind::Text { text } => text,
            other => panic!("expected a text node, got {other:?}"),
        }
    }

    struct Store {
        label: String,
        drops: Rc<Cell<u32>>,
    }

    impl Drop for Store {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    #[test]
    fn scoped_child_builds_once_then_exactly_twice_after_retag() {
        init_logs();

        let builds = Rc::new(Cell::new(0u32));
        let drops = Rc::new(Cell::new(0u32));
        let tag = value("alpha".to_string());

        let tree = Tree::mount({
            let builds = builds.clone();
            let drops = drops.clone();
            let tag = tag.clone();
            move || {
                let t = tag.get();
                Scoped(
                    Some(t.as_str()),
                    {
                        let t = t.clone();
                        let drops = drops.clone();
                        move || Store { label: t, drops }
                    },
                    {
                        let t = t.clone();
                        let builds = builds.clone();
                        move || {
                            builds.set(builds.get() + 1);
                            let store: Rc<Store> = resolve(Some(t.as_str())).unwrap();
                            Text(store.label.clone())
                        }
                    },
                )
            }
        });

        // first render: the child builds exactly once
        assert_eq!(builds.get(), 1);
        assert_eq!(drops.get(), 0);
        assert_eq!(text_of(&tree.root()), "alpha");

        // reconfigure the factory with a different tag and rebuild
        tag.set("beta".to_string());
        assert!(tree.pump().unwrap());

        // exactly one additional build; the alpha store was released
        assert_eq!(builds.get(), 2);
        assert_eq!(drops.get(), 1);
        assert_eq!(text_of(&tree.root()), "beta");

        // a clean pump does not rebuild
        assert!(!tree.pump().unwrap());
        assert_eq!(builds.get(), 2);
    }

    #[test]
    fn same_tag_reuses_the_instance() {
        let made = Rc::new(Cell::new(0u32));
        let tag = value("a".to_string());

        let tree = Tree::mount({
            let made = made.clone();
            let tag = tag.clone();
            move || {
                let t = tag.get();
                let made = made.clone();
                Scoped(
                    Some(t.as_str()),
                    move || {
                        made.set(made.get() + 1);
                        7u32
                    },
                    Group,
                )
            }
        });
        assert_eq!(made.get(), 1);

        tag.set("a".to_string()); // unchanged tag, new pass
        tree.pump().unwrap();
        assert_eq!(made.get(), 1);

        tag.set("b".to_string());
        tree.pump().unwrap();
        assert_eq!(made.get(), 2);
    }

    #[test]
    fn unmount_disposes_scope_owned_state() {
        let drops = Rc::new(Cell::new(0u32));
        let pings = value(0);

        let tree = Tree::mount({
            let drops = drops.clone();
            let pings = pings.clone();
            move || {
                let drops = drops.clone();
                let pings = pings.clone();
                Scoped(
                    None,
                    move || Store {
                        label: "svc".into(),
                        drops,
                    },
                    move || {
                        // listener owned by the scope; detaches on unmount
                        pings.subscribe_scoped(|_| {});
                        Group()
                    },
                )
            }
        });
        assert_eq!(pings.subscriber_count(), 1);
        assert_eq!(drops.get(), 0);

        tree.unmount();
        assert_eq!(drops.get(), 1);
        assert_eq!(pings.subscriber_count(), 0);
    }

    struct Cfg {
        source: &'static str,
    }

    struct Conn {
        name: &'static str,
    }

    #[test]
    fn nested_scope_resolves_through_ancestors() {
        let tree = Tree::mount(|| {
            Scoped(
                None,
                || Cfg { source: "outer" },
                || {
                    Scoped(
                        None,
                        || Conn { name: "db" },
                        || {
                            let cfg: Rc<Cfg> = resolve(None).unwrap();
                            let conn: Rc<Conn> = resolve(None).unwrap();
                            Text(format!("{}/{}", cfg.source, conn.name))
                        },
                    )
                },
            )
        });
        assert_eq!(text_of(&tree.root()), "outer/db");
    }

    #[test]
    fn nested_provision_shadows_outer() {
        let tree = Tree::mount(|| {
            Scoped(
                None,
                || Cfg { source: "outer" },
                || {
                    Scoped(
                        None,
                        || Cfg { source: "inner" },
                        || {
                            let cfg: Rc<Cfg> = resolve(None).unwrap();
                            Text(cfg.source)
                        },
                    )
                },
            )
        });
        assert_eq!(text_of(&tree.root()), "inner");
    }

    #[test]
    fn status_view_renders_transitions() {
        let weather: StatusValue<String, String> = StatusValue::new();

        let tree = Tree::mount({
            let weather = weather.clone();
            move || {
                let builders = StatusBuilders::new(
                    || Text("loading"),
                    |v: &String| Text(format!("ok: {v}")),
                    |e: &String| Text(format!("err: {e}")),
                );
                StatusView(&weather, &builders)
            }
        });

        // idle falls back to the loading branch
        assert_eq!(text_of(&tree.root()), "loading");

        weather.start().unwrap();
        tree.pump().unwrap();
        assert_eq!(text_of(&tree.root()), "loading");

        weather.resolve("sunny".to_string()).unwrap();
        assert!(tree.pump().unwrap());
        assert_eq!(text_of(&tree.root()), "ok: sunny");

        weather.refresh().unwrap();
        assert!(tree.pump().unwrap());
        assert_eq!(text_of(&tree.root()), "loading");
        assert_eq!(weather.last_success().as_deref(), Some("sunny"));

        weather.reject("offline".to_string()).unwrap();
        assert!(tree.pump().unwrap());
        assert_eq!(text_of(&tree.root()), "err: offline");
    }

    #[test]
    fn status_view_idle_branch() {
        let s: StatusValue<u32, String> = StatusValue::new();

        let tree = Tree::mount({
            let s = s.clone();
            move || {
                let builders = StatusBuilders::new(
                    || Text("loading"),
                    |v: &u32| Text(format!("{v}")),
                    |e: &String| Text(e.clone()),
                )
                .idle(|| Text("tap to load"));
                StatusView(&s, &builders)
            }
        });
        assert_eq!(text_of(&tree.root()), "tap to load");
    }

    #[test]
    fn button_click_recomposes_counter() {
        let count = value(0);

        let tree = Tree::mount({
            let count = count.clone();
            move || {
                let count = count.clone();
                Column()
                    .child(Observing(&count, |c| Text(format!("count = {c}"))))
                    .child(Button("+1", move || count.update(|c| *c += 1)))
            }
        });
        assert_eq!(text_of(&tree.root().children[0]), "count = 0");

        let click = {
            let root = tree.root();
            match &root.children[1].kind {
                ViewKind::Button {
                    on_click: Some(f), ..
                } => f.clone(),
                other => panic!("expected a button, got {other:?}"),
            }
        };

        click();
        assert!(tree.is_dirty());
        tree.pump().unwrap();
        assert_eq!(text_of(&tree.root().children[0]), "count = 1");
    }
}
