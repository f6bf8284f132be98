//! Tree-walking interpreter over the script AST.
//!
//! Every statement and expression node costs one step of fuel. The clock
//! is only read every `ScriptLimits::CLOCK_INTERVAL` steps.

use super::api::RulesApi;
use super::ast::{Expr, PlayerRef, Selector, Side, Stmt, Target};
use super::context::{ScriptContext, ScriptLimits};
use super::error::{ScriptError, ScriptResult};
use crate::core::{EntityId, PlayerId};
use crate::entities::tags;

impl ScriptContext {
    fn tick(&mut self) -> ScriptResult<()> {
        self.steps += 1;
        if self.steps > self.limits.fuel {
            return Err(ScriptError::FuelExhausted(self.limits.fuel));
        }
        if self.steps % ScriptLimits::CLOCK_INTERVAL == 0
            && self.started.elapsed() >= self.limits.timeout
        {
            return Err(ScriptError::Timeout(self.limits.timeout));
        }
        Ok(())
    }

    pub(super) fn exec_block(
        &mut self,
        stmts: &[Stmt],
        api: &mut dyn RulesApi,
        rule: &str,
    ) -> ScriptResult<()> {
        for stmt in stmts {
            self.exec(stmt, api, rule)?;
        }
        Ok(())
    }

    fn exec(&mut self, stmt: &Stmt, api: &mut dyn RulesApi, rule: &str) -> ScriptResult<()> {
        self.tick()?;
        let source = self.entity;
        match stmt {
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond, api)? != 0 {
                    self.exec_block(then, api, rule)
                } else {
                    self.exec_block(otherwise, api, rule)
                }
            }
            Stmt::ForEach { selector, body } => {
                let matches = self.select(selector, api)?;
                for id in matches {
                    self.it.push(id);
                    let result = self.exec_block(body, api, rule);
                    self.it.pop();
                    result?;
                }
                Ok(())
            }
            Stmt::ForEachPlayer { body } => {
                for player in PlayerId::all(api.player_count()) {
                    self.each.push(player);
                    let result = self.exec_block(body, api, rule);
                    self.each.pop();
                    result?;
                }
                Ok(())
            }
            Stmt::DealDamage { target, amount } => {
                let target = self.target(target, api)?;
                let amount = self.eval(amount, api)?;
                api.deal_damage(source, target, amount)
            }
            Stmt::Heal { target, amount } => {
                let target = self.target(target, api)?;
                let amount = self.eval(amount, api)?;
                api.heal(source, target, amount)
            }
            Stmt::Draw { player, count } => {
                let player = self.player(player, api)?;
                let count = self.eval(count, api)?.max(0);
                let count = u32::try_from(count).map_err(|_| ScriptError::Overflow)?;
                api.draw(player, count)
            }
            Stmt::AddRule { target, rule: id } => {
                let target = self.target(target, api)?;
                api.add_rule(target, id)
            }
            Stmt::RemoveRule { target, rule: id } => {
                let target = self.target(target, api)?;
                api.remove_rule(target, id)
            }
            Stmt::Disenchant { target } => {
                let target = self.target(target, api)?;
                api.disenchant(target)
            }
            Stmt::Spawn { card, player } => {
                let owner = self.player(player, api)?;
                api.spawn(card, owner, source).map(|_| ())
            }
            Stmt::Destroy { target } => {
                let target = self.target(target, api)?;
                api.destroy(source, target)
            }
            Stmt::Buff {
                target,
                stat,
                amount,
            } => {
                let target = self.target(target, api)?;
                let amount = self.eval(amount, api)?;
                api.buff(target, stat, amount)
            }
            Stmt::SetVar { target, var, value } => {
                let target = self.target(target, api)?;
                let value = self.eval(value, api)?;
                api.set_var(target, var, value)
            }
            Stmt::AddVar {
                target,
                var,
                amount,
            } => {
                let target = self.target(target, api)?;
                let amount = self.eval(amount, api)?;
                api.add_var(target, var, amount)
            }
            Stmt::AddBase {
                target,
                stat,
                amount,
            } => {
                let target = self.target(target, api)?;
                let amount = self.eval(amount, api)?;
                api.add_base(target, stat, amount)
            }
            Stmt::AddTag { target, tag } => {
                let target = self.target(target, api)?;
                api.add_tag(target, tag)
            }
            Stmt::RemoveTag { target, tag } => {
                let target = self.target(target, api)?;
                api.remove_tag(target, tag)
            }
            Stmt::GameOver { winner } => {
                let winner = match winner {
                    Some(w) => Some(self.player(w, api)?),
                    None => None,
                };
                api.game_over(winner)
            }
            Stmt::Trace(message) => {
                api.trace(rule, message);
                Ok(())
            }
            Stmt::Reject(message) => {
                self.rejections.push(message.clone());
                Ok(())
            }
        }
    }

    fn eval(&mut self, expr: &Expr, api: &dyn RulesApi) -> ScriptResult<i64> {
        self.tick()?;
        let value = match expr {
            Expr::Int(n) => *n,
            Expr::Stat(target, stat) => self.entity_of(target, api)?.current_value(stat),
            Expr::Base(target, stat) => self.entity_of(target, api)?.base_value(stat),
            Expr::Var(target, var) => self.entity_of(target, api)?.var(var),
            Expr::HasTag(target, tag) => i64::from(self.entity_of(target, api)?.has_tag(tag)),
            Expr::Amount => self.event.as_ref().map_or(0, |e| e.amount()),
            Expr::Turn => i64::from(api.turn()),
            Expr::HandSize(player) => {
                let player = self.player(player, api)?;
                i64::try_from(api.hand_size(player)).map_err(|_| ScriptError::Overflow)?
            }
            Expr::Count(selector) => {
                let count = self.select(selector, api)?.len();
                i64::try_from(count).map_err(|_| ScriptError::Overflow)?
            }
            Expr::Same(a, b) => {
                let a = self.target(a, api)?;
                let b = self.target(b, api)?;
                i64::from(a == b)
            }
            Expr::SamePlayer(a, b) => {
                let a = self.player(a, api)?;
                let b = self.player(b, api)?;
                i64::from(a == b)
            }
            Expr::Exists(target) => {
                let live = match self.target(target, api) {
                    Ok(id) => api.entity(id).is_some_and(|e| e.is_in_play()),
                    Err(ScriptError::Unbound(_)) => false,
                    Err(err) => return Err(err),
                };
                i64::from(live)
            }
            Expr::Add(a, b) => {
                let (a, b) = self.pair(a, b, api)?;
                a.checked_add(b).ok_or(ScriptError::Overflow)?
            }
            Expr::Sub(a, b) => {
                let (a, b) = self.pair(a, b, api)?;
                a.checked_sub(b).ok_or(ScriptError::Overflow)?
            }
            Expr::Mul(a, b) => {
                let (a, b) = self.pair(a, b, api)?;
                a.checked_mul(b).ok_or(ScriptError::Overflow)?
            }
            Expr::Neg(a) => self.eval(a, api)?.checked_neg().ok_or(ScriptError::Overflow)?,
            Expr::Eq(a, b) => {
                let (a, b) = self.pair(a, b, api)?;
                i64::from(a == b)
            }
            Expr::Ne(a, b) => {
                let (a, b) = self.pair(a, b, api)?;
                i64::from(a != b)
            }
            Expr::Lt(a, b) => {
                let (a, b) = self.pair(a, b, api)?;
                i64::from(a < b)
            }
            Expr::Le(a, b) => {
                let (a, b) = self.pair(a, b, api)?;
                i64::from(a <= b)
            }
            Expr::Gt(a, b) => {
                let (a, b) = self.pair(a, b, api)?;
                i64::from(a > b)
            }
            Expr::Ge(a, b) => {
                let (a, b) = self.pair(a, b, api)?;
                i64::from(a >= b)
            }
            // Short-circuit.
            Expr::And(a, b) => i64::from(self.eval(a, api)? != 0 && self.eval(b, api)? != 0),
            Expr::Or(a, b) => i64::from(self.eval(a, api)? != 0 || self.eval(b, api)? != 0),
            Expr::Not(a) => i64::from(self.eval(a, api)? == 0),
        };
        Ok(value)
    }

    fn pair(&mut self, a: &Expr, b: &Expr, api: &dyn RulesApi) -> ScriptResult<(i64, i64)> {
        Ok((self.eval(a, api)?, self.eval(b, api)?))
    }

    fn entity_of<'a>(
        &mut self,
        target: &Target,
        api: &'a dyn RulesApi,
    ) -> ScriptResult<&'a crate::entities::GameEntity> {
        let id = self.target(target, api)?;
        api.entity(id).ok_or(ScriptError::UnknownEntity(id))
    }

    fn target(&mut self, target: &Target, api: &dyn RulesApi) -> ScriptResult<EntityId> {
        let event = self.event.as_ref();
        match target {
            Target::This => self.entity.ok_or(ScriptError::Unbound("This")),
            Target::Cause => event.and_then(|e| e.cause).ok_or(ScriptError::Unbound("Cause")),
            Target::Subject => event
                .and_then(|e| e.subject())
                .ok_or(ScriptError::Unbound("Subject")),
            Target::EventTarget => event
                .and_then(|e| e.target())
                .ok_or(ScriptError::Unbound("EventTarget")),
            Target::It => self.it.last().copied().ok_or(ScriptError::Unbound("It")),
            Target::Avatar(player) => {
                let player = self.player(player, api)?;
                api.avatar(player).ok_or(ScriptError::UnknownPlayer(player))
            }
        }
    }

    fn player(&mut self, player: &PlayerRef, api: &dyn RulesApi) -> ScriptResult<PlayerId> {
        match player {
            PlayerRef::Owner => self.host_owner(api)?.ok_or(ScriptError::Unbound("Owner")),
            PlayerRef::Opponent => {
                let owner = self.host_owner(api)?.ok_or(ScriptError::Unbound("Opponent"))?;
                let count = api.player_count().max(1);
                Ok(PlayerId::new(((owner.index() + 1) % count) as u8))
            }
            PlayerRef::Current => Ok(api.current_player()),
            PlayerRef::EventPlayer => self
                .event
                .as_ref()
                .and_then(|e| e.player())
                .ok_or(ScriptError::Unbound("EventPlayer")),
            PlayerRef::Each => self.each.last().copied().ok_or(ScriptError::Unbound("Each")),
            PlayerRef::OwnerOf(target) => {
                let entity = self.entity_of(target, api)?;
                entity.owner.ok_or(ScriptError::Unbound("OwnerOf"))
            }
        }
    }

    fn host_owner(&self, api: &dyn RulesApi) -> ScriptResult<Option<PlayerId>> {
        let host = self.entity.ok_or(ScriptError::Unbound("This"))?;
        let entity = api.entity(host).ok_or(ScriptError::UnknownEntity(host))?;
        Ok(entity.owner)
    }

    fn select(&mut self, selector: &Selector, api: &dyn RulesApi) -> ScriptResult<Vec<EntityId>> {
        let host_owner = match self.entity {
            Some(_) => self.host_owner(api)?,
            None => None,
        };
        let mut matches = Vec::new();
        for id in api.active_entities() {
            self.tick()?;
            let Some(entity) = api.entity(id) else { continue };
            let side_ok = match selector.side {
                Side::Any => true,
                Side::Friendly => entity.owner.is_some() && entity.owner == host_owner,
                Side::Enemy => entity.owner.is_some() && entity.owner != host_owner,
            };
            if side_ok
                && selector.tags.iter().all(|t| entity.has_tag(t))
                && !selector.without.iter().any(|t| entity.has_tag(t))
            {
                matches.push(id);
            }
        }
        Ok(matches)
    }
}

/// Whether `id` is an in-play entity, for facades that need the check.
pub(crate) fn require_in_play(api: &dyn super::api::RulesView, id: EntityId) -> ScriptResult<()> {
    match api.entity(id) {
        None => Err(ScriptError::UnknownEntity(id)),
        Some(e) if !e.has_tag(tags::IN_PLAY) => Err(ScriptError::NotInPlay(id)),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::entities::{stats, vars, EntityStore, GameEntity};
    use crate::events::{EventKind, GameEvent};
    use crate::script::api::{BuffOnly, ReadOnly, RulesView};
    use crate::script::Program;

    /// Minimal world: two avatars and whatever the test adds.
    struct World {
        store: EntityStore,
        avatars: Vec<EntityId>,
        turn: u32,
        drawn: Vec<(PlayerId, u32)>,
        winner: Option<Option<PlayerId>>,
    }

    impl World {
        fn new() -> Self {
            let mut store = EntityStore::new();
            let mut avatars = Vec::new();
            for p in 0..2u8 {
                let id = store.alloc_id();
                store.insert(
                    GameEntity::new(id, "Hero", Some(PlayerId::new(p)))
                        .with_tag(tags::PLAYER)
                        .with_tag(tags::IN_PLAY)
                        .with_base(stats::MAX_HEALTH, 30),
                );
                avatars.push(id);
            }
            Self {
                store,
                avatars,
                turn: 0,
                drawn: Vec::new(),
                winner: None,
            }
        }

        fn minion(&mut self, owner: u8, attack: i64) -> EntityId {
            let id = self.store.alloc_id();
            let mut e = GameEntity::new(id, "Minion", Some(PlayerId::new(owner)))
                .with_tag(tags::MINION)
                .with_base(stats::MAX_HEALTH, 3)
                .with_base(stats::ATTACK, attack);
            e.enter_play();
            self.store.insert(e)
        }
    }

    impl RulesView for World {
        fn entity(&self, id: EntityId) -> Option<&GameEntity> {
            self.store.get(id)
        }
        fn active_entities(&self) -> Vec<EntityId> {
            self.store.snapshot().into_iter().collect()
        }
        fn avatar(&self, player: PlayerId) -> Option<EntityId> {
            self.avatars.get(player.index()).copied()
        }
        fn player_count(&self) -> usize {
            self.avatars.len()
        }
        fn current_player(&self) -> PlayerId {
            PlayerId::for_turn(self.turn, self.avatars.len())
        }
        fn turn(&self) -> u32 {
            self.turn
        }
        fn hand_size(&self, player: PlayerId) -> usize {
            self.store.hand(player).len()
        }
    }

    impl RulesApi for World {
        fn draw(&mut self, player: PlayerId, count: u32) -> ScriptResult<()> {
            self.drawn.push((player, count));
            Ok(())
        }
        fn deal_damage(&mut self, _: Option<EntityId>, target: EntityId, amount: i64) -> ScriptResult<()> {
            let e = self.store.get_mut(target).ok_or(ScriptError::UnknownEntity(target))?;
            e.add_var(vars::CURRENT_HEALTH, -amount);
            Ok(())
        }
        fn buff(&mut self, target: EntityId, stat: &str, delta: i64) -> ScriptResult<()> {
            let e = self.store.get_mut(target).ok_or(ScriptError::UnknownEntity(target))?;
            e.adjust_derived(stat, delta);
            Ok(())
        }
        fn game_over(&mut self, winner: Option<PlayerId>) -> ScriptResult<()> {
            self.winner = Some(winner);
            Ok(())
        }
    }

    fn run(world: &mut World, host: EntityId, event: Option<&GameEvent>, script: &str) -> ScriptResult<ScriptContext> {
        let program = Program::compile(script).unwrap();
        let mut ctx = ScriptContext::new(ScriptLimits::default());
        ctx.bind(event, Some(host));
        ctx.run(&program, world, "test")?;
        Ok(ctx)
    }

    #[test]
    fn test_draw_for_owner_on_own_turn() {
        let mut world = World::new();
        let host = world.avatars[1];
        let event = GameEvent::new(EventKind::TurnStarted { player: PlayerId::new(1), turn: 1 });
        let script = "[If(cond: SamePlayer(EventPlayer, Owner), then: [Draw(player: Owner, count: Int(2))])]";

        run(&mut world, host, Some(&event), script).unwrap();
        assert_eq!(world.drawn, vec![(PlayerId::new(1), 2)]);

        let other = GameEvent::new(EventKind::TurnStarted { player: PlayerId::new(0), turn: 2 });
        run(&mut world, host, Some(&other), script).unwrap();
        assert_eq!(world.drawn.len(), 1);
    }

    #[test]
    fn test_for_each_enemy_minion() {
        let mut world = World::new();
        let friendly = world.minion(0, 1);
        let enemy_a = world.minion(1, 1);
        let enemy_b = world.minion(1, 2);
        let script = r#"[ForEach(
            selector: (tags: ["MINION"], side: Enemy),
            body: [DealDamage(target: It, amount: Stat(It, "ATTACK"))],
        )]"#;

        run(&mut world, friendly, None, script).unwrap();

        assert_eq!(world.store.get(friendly).unwrap().health(), 3);
        assert_eq!(world.store.get(enemy_a).unwrap().health(), 2);
        assert_eq!(world.store.get(enemy_b).unwrap().health(), 1);
    }

    #[test]
    fn test_opponent_and_avatar() {
        let mut world = World::new();
        let host = world.minion(0, 1);
        run(&mut world, host, None, "[DealDamage(target: Avatar(Opponent), amount: Int(5))]").unwrap();
        assert_eq!(world.store.get(world.avatars[1]).unwrap().health(), -5);
    }

    #[test]
    fn test_unbound_cause_for_startup() {
        let mut world = World::new();
        let host = world.avatars[0];
        let err = run(&mut world, host, None, "[Destroy(target: Cause)]").unwrap_err();
        assert_eq!(err, ScriptError::Unbound("Cause"));
    }

    #[test]
    fn test_exists_tolerates_unbound() {
        let mut world = World::new();
        let host = world.avatars[0];
        let script = "[If(cond: Exists(Cause), then: [], otherwise: [GameOver(winner: Some(Owner))])]";
        run(&mut world, host, None, script).unwrap();
        assert_eq!(world.winner, Some(Some(PlayerId::new(0))));
    }

    #[test]
    fn test_read_only_refuses_mutation() {
        let world = World::new();
        let host = world.avatars[0];
        let program = Program::compile("[Draw(player: Owner, count: Int(1))]").unwrap();
        let mut ctx = ScriptContext::new(ScriptLimits::default());
        ctx.bind(None, Some(host));
        let err = ctx.run(&program, &mut ReadOnly(&world), "v").unwrap_err();
        assert_eq!(err, ScriptError::ReadOnly("Draw"));
        assert!(world.drawn.is_empty());
    }

    #[test]
    fn test_buff_only_permits_buff() {
        let mut world = World::new();
        let host = world.minion(0, 1);
        let program = Program::compile(r#"[Buff(target: This, stat: "ATTACK", amount: Int(2))]"#).unwrap();
        let mut ctx = ScriptContext::new(ScriptLimits::default());
        ctx.bind(None, Some(host));
        ctx.run(&program, &mut BuffOnly(&mut world), "aura").unwrap();
        assert_eq!(world.store.get(host).unwrap().current_value(stats::ATTACK), 3);

        let program = Program::compile("[GameOver(winner: None)]").unwrap();
        let err = ctx.run(&program, &mut BuffOnly(&mut world), "aura").unwrap_err();
        assert_eq!(err, ScriptError::ReadOnly("GameOver"));
    }

    #[test]
    fn test_reject_collects_messages() {
        let mut world = World::new();
        let host = world.avatars[0];
        let ctx = run(&mut world, host, None, r#"[Reject("no targets"), Reject("too early")]"#).unwrap();
        assert_eq!(ctx.rejections(), ["no targets", "too early"]);
    }

    #[test]
    fn test_fuel_exhaustion() {
        let mut world = World::new();
        let host = world.avatars[0];
        let program = Program::compile("[Trace(\"a\"), Trace(\"b\"), Trace(\"c\")]").unwrap();
        let mut ctx = ScriptContext::new(ScriptLimits::new(2, Duration::from_secs(1)));
        ctx.bind(None, Some(host));
        let err = ctx.run(&program, &mut world, "loop").unwrap_err();
        assert_eq!(err, ScriptError::FuelExhausted(2));
    }

    #[test]
    fn test_timeout_checked_on_interval() {
        let mut world = World::new();
        let host = world.avatars[0];
        let stmts = (0..100).map(|_| "Trace(\"x\")").collect::<Vec<_>>().join(",");
        let program = Program::compile(&format!("[{stmts}]")).unwrap();
        let mut ctx = ScriptContext::new(ScriptLimits::new(1_000, Duration::ZERO));
        ctx.bind(None, Some(host));
        let err = ctx.run(&program, &mut world, "slow").unwrap_err();
        assert_eq!(err, ScriptError::Timeout(Duration::ZERO));
        assert_eq!(ctx.steps(), ScriptLimits::CLOCK_INTERVAL);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let mut world = World::new();
        let host = world.avatars[0];
        let script = format!("[DealDamage(target: This, amount: Add(Int({}), Int(1)))]", i64::MAX);
        let err = run(&mut world, host, None, &script).unwrap_err();
        assert_eq!(err, ScriptError::Overflow);
    }

    #[test]
    fn test_bind_clears_previous_state() {
        let mut world = World::new();
        let host = world.avatars[0];
        let mut ctx = run(&mut world, host, None, r#"[Reject("x")]"#).unwrap();
        ctx.bind(None, Some(host));
        assert!(ctx.rejections().is_empty());
    }
}
