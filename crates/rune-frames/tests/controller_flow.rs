use anyhow::Result;
use rune_frames::{
    Delivery, Dispatched, FollowFilter, FrameController, FrameEvent, FrameId, GeometryReport,
    Inbound, KeyEvent, LocalLink, Outbound, Point, RecordingHost, Rect, RouterOptions, Size,
    SubframeReport, ViewHandle, ViewId,
};

const VIEW: ViewId = ViewId(1);
const ROOT: FrameId = FrameId::new(1, 10);
const CHILD: FrameId = FrameId::new(2, 11);
const AD: FrameId = FrameId::new(3, 12);

fn geometry(controller: &mut FrameController, host: &mut RecordingHost) {
    controller.handle(host, Inbound::ReportGeometry(GeometryReport::new(CHILD, "https://child.test/")));
    controller.handle(host, Inbound::ReportGeometry(GeometryReport::new(AD, "https://ad.test/")));
    controller.handle(
        host,
        Inbound::ReportGeometry(
            GeometryReport::new(ROOT, "https://root.test/")
                .with_subframe(SubframeReport::new(
                    "https://child.test/",
                    Rect::new(100.0, 50.0, 300.0, 200.0),
                    Size::new(350.0, 600.0),
                ))
                .with_subframe(SubframeReport::new(
                    "https://ad.test/",
                    Rect::new(0.0, 400.0, 200.0, 100.0),
                    Size::new(350.0, 600.0),
                )),
        ),
    );
}

fn setup() -> (FrameController, RecordingHost) {
    let mut host = RecordingHost::new();
    host.add_view(VIEW, ROOT, vec![ROOT, CHILD, AD]);
    let mut controller = FrameController::new(RouterOptions::default());
    geometry(&mut controller, &mut host);
    (controller, host)
}

#[test]
fn click_is_delivered_in_frame_space() -> Result<()> {
    let (mut controller, mut host) = setup();
    let dispatched = controller.dispatch(&mut host, VIEW, FrameEvent::click(120.0, 70.0));
    assert_eq!(dispatched, Dispatched::Frame(CHILD));
    assert_eq!(
        host.sent_to(CHILD),
        vec![&Outbound::DeliverEvent { event: FrameEvent::click(20.0, 20.0) }]
    );
    Ok(())
}

#[test]
fn miss_goes_to_main_frame_unchanged() -> Result<()> {
    let (mut controller, mut host) = setup();
    let dispatched = controller.dispatch(&mut host, VIEW, FrameEvent::click(700.0, 20.0));
    assert_eq!(dispatched, Dispatched::Root(ROOT));
    assert_eq!(
        host.sent_to(ROOT),
        vec![&Outbound::DeliverEvent { event: FrameEvent::click(700.0, 20.0) }]
    );
    Ok(())
}

#[test]
fn keys_go_native_then_to_subframes() -> Result<()> {
    let (mut controller, mut host) = setup();
    let key = KeyEvent::down("Escape");
    let dispatched = controller.dispatch(&mut host, VIEW, FrameEvent::Key(key.clone()));
    assert_eq!(dispatched, Dispatched::Broadcast { delivered: 2 });

    assert_eq!(host.deliveries[0], Delivery::NativeKey { view: VIEW, event: key.clone() });
    assert!(host.sent_to(ROOT).is_empty());
    assert_eq!(host.sent_to(CHILD), vec![&Outbound::KeyNotification { event: key.clone() }]);
    assert_eq!(host.sent_to(AD), vec![&Outbound::KeyNotification { event: key }]);
    Ok(())
}

#[test]
fn destroyed_target_is_swallowed() -> Result<()> {
    let (mut controller, mut host) = setup();
    host.destroy_frame(CHILD);
    let dispatched = controller.dispatch(&mut host, VIEW, FrameEvent::click(120.0, 70.0));
    assert_eq!(dispatched, Dispatched::Dropped);
    assert!(host.notifications.is_empty());

    // The next event is unaffected.
    let dispatched = controller.dispatch(&mut host, VIEW, FrameEvent::click(50.0, 450.0));
    assert_eq!(dispatched, Dispatched::Frame(AD));
    Ok(())
}

#[test]
fn selection_crossing_frames_goes_to_start_frame() -> Result<()> {
    let (mut controller, mut host) = setup();
    let event = FrameEvent::SelectionSpan {
        start: Point::new(150.0, 100.0),
        end: Point::new(100.0, 450.0),
        text: Some("across".into()),
    };
    assert_eq!(controller.dispatch(&mut host, VIEW, event), Dispatched::Frame(CHILD));
    assert_eq!(
        host.sent_to(CHILD),
        vec![&Outbound::DeliverEvent {
            event: FrameEvent::SelectionSpan {
                start: Point::new(50.0, 50.0),
                end: Point::new(0.0, 400.0),
                text: Some("across".into()),
            }
        }]
    );
    assert!(host.sent_to(AD).is_empty());
    Ok(())
}

#[test]
fn follow_mode_session() -> Result<()> {
    let (mut controller, mut host) = setup();
    assert_eq!(controller.start_follow_mode(&mut host, VIEW, FollowFilter::Links), 3);
    assert_eq!(
        host.sent_to(CHILD),
        vec![&Outbound::StartFollowMode { filter: FollowFilter::Links }]
    );

    let report = |links: Vec<LocalLink>| Inbound::ReportLinks { frame_id: CHILD, links };
    controller.handle(&mut host, report(vec![LocalLink::at(10.0, 10.0), LocalLink::at(300.0, 10.0)]));
    controller.handle(&mut host, Inbound::ReportLinks { frame_id: ROOT, links: vec![LocalLink::at(5.0, 5.0)] });
    controller.handle(&mut host, report(vec![LocalLink::at(20.0, 30.0)]));

    let links = controller.links().snapshot();
    let child: Vec<_> = links.iter().filter(|l| l.frame_id == CHILD).collect();
    assert_eq!(child.len(), 1, "only the latest batch of a frame survives");
    assert_eq!((child[0].x, child[0].y), (120.0, 80.0));
    assert_eq!(links.len(), 2);

    // A new session starts from an empty list.
    controller.stop_follow_mode(&mut host);
    assert_eq!(controller.links().len(), 2);
    controller.start_follow_mode(&mut host, VIEW, FollowFilter::All);
    assert!(controller.links().is_empty());
    Ok(())
}

#[test]
fn clipped_links_are_dropped() -> Result<()> {
    let (mut controller, mut host) = setup();
    controller.start_follow_mode(&mut host, VIEW, FollowFilter::All);
    // The child is 300 wide but only 250 of it is inside the parent.
    controller.handle(
        &mut host,
        Inbound::ReportLinks { frame_id: CHILD, links: vec![LocalLink::at(260.0, 10.0)] },
    );
    assert!(controller.links().is_empty());
    Ok(())
}

#[test]
fn links_of_vanished_frames_are_evicted() -> Result<()> {
    let (mut controller, mut host) = setup();
    controller.start_follow_mode(&mut host, VIEW, FollowFilter::All);
    controller.handle(&mut host, Inbound::ReportLinks { frame_id: AD, links: vec![LocalLink::at(1.0, 1.0)] });
    host.destroy_frame(AD);
    controller.handle(&mut host, Inbound::ReportLinks { frame_id: ROOT, links: vec![LocalLink::at(5.0, 5.0)] });
    assert!(controller.links().entries().iter().all(|l| l.frame_id == ROOT));
    Ok(())
}

#[test]
fn reported_events_become_absolute() -> Result<()> {
    let (mut controller, mut host) = setup();
    let event = controller.handle_json(
        &mut host,
        r#"{"type":"report-event","frame_id":"2-11","event":{"kind":"context-menu","at":{"x":5.0,"y":6.0},"link":"https://x.test/"}}"#,
    );
    let Some(rune_frames::ControllerEvent::Event(abs)) = event else {
        panic!("expected an absolute event");
    };
    assert_eq!(
        abs.event,
        FrameEvent::ContextMenu { at: Point::new(105.0, 56.0), link: Some("https://x.test/".into()) }
    );
    assert_eq!(abs.view, Some(VIEW));
    assert_eq!(abs.frame.map(|m| m.frame_id), Some(CHILD));
    Ok(())
}

#[test]
fn lookup_failures_surface_as_diagnostics() -> Result<()> {
    let (mut controller, mut host) = setup();
    controller.handle(
        &mut host,
        Inbound::ReportEvent { frame_id: FrameId::new(99, 99), event: FrameEvent::click(1.0, 1.0) },
    );
    controller.handle_json(&mut host, "{broken");
    assert_eq!(controller.dispatch(&mut host, ViewId(42), FrameEvent::click(1.0, 1.0)), Dispatched::Dropped);
    assert_eq!(host.notifications.len(), 3);

    // Still routing normally afterwards.
    assert_eq!(
        controller.dispatch(&mut host, VIEW, FrameEvent::click(120.0, 70.0)),
        Dispatched::Frame(CHILD)
    );
    Ok(())
}

#[test]
fn closing_a_view_forgets_its_frames() -> Result<()> {
    let (mut controller, mut host) = setup();
    controller.start_follow_mode(&mut host, VIEW, FollowFilter::All);
    host.remove_view(VIEW);
    let removed = controller.close_view(&mut host, ViewHandle { id: VIEW, main_frame: ROOT });
    assert_eq!(removed, 3);
    assert!(controller.registry().is_empty());
    assert!(controller.session().is_none());
    Ok(())
}

#[test]
fn closing_a_view_forgets_frames_it_never_placed() -> Result<()> {
    let (mut controller, mut host) = setup();
    let orphan = FrameId::new(6, 14);
    host.add_view(VIEW, ROOT, vec![ROOT, CHILD, AD, orphan]);
    controller.handle(&mut host, Inbound::ReportGeometry(GeometryReport::new(orphan, "https://orphan.test/")));

    host.remove_view(VIEW);
    let removed = controller.close_view(&mut host, ViewHandle { id: VIEW, main_frame: ROOT });
    assert_eq!(removed, 4);
    assert!(!controller.registry().contains(orphan));
    Ok(())
}

#[test]
fn prune_drops_destroyed_frames_that_were_never_placed() -> Result<()> {
    let (mut controller, mut host) = setup();
    let orphan = FrameId::new(6, 14);
    host.add_view(VIEW, ROOT, vec![ROOT, CHILD, AD, orphan]);
    controller.handle(&mut host, Inbound::ReportGeometry(GeometryReport::new(orphan, "https://orphan.test/")));

    assert_eq!(controller.prune_view(&mut host, VIEW), 0);
    host.destroy_frame(orphan);
    assert_eq!(controller.prune_view(&mut host, VIEW), 1);
    assert!(!controller.registry().contains(orphan));
    assert!(controller.registry().contains(CHILD));
    Ok(())
}

#[test]
fn same_url_in_two_views_stays_apart() -> Result<()> {
    let (mut controller, mut host) = setup();
    let second_view = ViewId(2);
    let second_main = FrameId::new(1, 20);
    let second_child = FrameId::new(2, 20);
    host.add_view(second_view, second_main, vec![second_main, second_child]);

    // The first page embeds a URL that never reports in its own view.
    controller.handle(
        &mut host,
        Inbound::ReportGeometry(GeometryReport::new(ROOT, "https://root.test/").with_subframe(
            SubframeReport::new("https://shared.test/", Rect::new(500.0, 500.0, 50.0, 50.0), Size::new(800.0, 600.0)),
        )),
    );
    controller.handle(&mut host, Inbound::ReportGeometry(GeometryReport::new(second_child, "https://inner.test/")));
    controller.handle(
        &mut host,
        Inbound::ReportGeometry(GeometryReport::new(second_main, "https://shared.test/").with_subframe(
            SubframeReport::new("https://inner.test/", Rect::new(10.0, 10.0, 100.0, 100.0), Size::new(800.0, 600.0)),
        )),
    );

    let main = controller.registry().get(second_main).expect("second main registered");
    assert_eq!(main.parent_id, None);
    assert_eq!(
        controller.dispatch(&mut host, second_view, FrameEvent::click(20.0, 20.0)),
        Dispatched::Frame(second_child)
    );
    assert_eq!(
        host.sent_to(second_child),
        vec![&Outbound::DeliverEvent { event: FrameEvent::click(10.0, 10.0) }]
    );
    Ok(())
}

#[test]
fn follow_start_prunes_stale_records() -> Result<()> {
    let (mut controller, mut host) = setup();
    host.destroy_frame(AD);
    controller.start_follow_mode(&mut host, VIEW, FollowFilter::All);
    assert!(!controller.registry().contains(AD));
    assert!(controller.registry().contains(CHILD));
    Ok(())
}
